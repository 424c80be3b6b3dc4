//! IBGE "localidades" API client.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::GeographyLookup;
use crate::error::ClientError;
use crate::models::{Division, SubDivision};

pub const IBGE_LOCALIDADES_URL: &str = "https://servicodados.ibge.gov.br/api/v1/localidades";

const USER_AGENT: &str = "Ecoleta/0.1 (collection point registration)";

#[derive(Debug, Deserialize)]
struct IbgeState {
    sigla: String,
    nome: String,
}

#[derive(Debug, Deserialize)]
struct IbgeCity {
    id: u64,
    nome: String,
}

/// Fetches states and municipalities from the IBGE geography service
#[derive(Clone)]
pub struct IbgeClient {
    client: Client,
    base_url: Url,
}

impl IbgeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    /// `{base}/{segments...}?orderBy=nome`
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("orderBy", "nome");
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = ClientError::check(response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl GeographyLookup for IbgeClient {
    async fn divisions(&self) -> Result<Vec<Division>, ClientError> {
        let url = self.endpoint(&["estados"])?;
        let states: Vec<IbgeState> = self.get_json(url).await?;

        debug!("Fetched {} states", states.len());
        Ok(states
            .into_iter()
            .map(|s| Division::new(s.sigla, s.nome))
            .collect())
    }

    async fn sub_divisions(&self, division_code: &str) -> Result<Vec<SubDivision>, ClientError> {
        let url = self.endpoint(&["estados", division_code, "municipios"])?;
        let cities: Vec<IbgeCity> = self.get_json(url).await?;

        debug!("Fetched {} cities for {}", cities.len(), division_code);
        Ok(cities
            .into_iter()
            .map(|c| SubDivision::new(c.id, c.nome))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_stub;
    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn stub_router() -> Router {
        Router::new()
            .route(
                "/api/v1/localidades/estados",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(q.get("orderBy").map(String::as_str), Some("nome"));
                    Json(json!([
                        { "id": 35, "sigla": "SP", "nome": "São Paulo" },
                        { "id": 33, "sigla": "RJ", "nome": "Rio de Janeiro" }
                    ]))
                }),
            )
            .route(
                "/api/v1/localidades/estados/{uf}/municipios",
                get(|Path(uf): Path<String>| async move {
                    match uf.as_str() {
                        "SP" => Ok(Json(json!([
                            { "id": 3509502, "nome": "Campinas", "microrregiao": {} }
                        ]))),
                        _ => Err::<Json<Value>, _>(StatusCode::NOT_FOUND),
                    }
                }),
            )
    }

    async fn client() -> IbgeClient {
        let base = spawn_stub(stub_router()).await;
        IbgeClient::new(
            &format!("{}/api/v1/localidades/", base),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_divisions_keep_service_order() {
        let divisions = client().await.divisions().await.unwrap();
        assert_eq!(
            divisions,
            vec![
                Division::new("SP", "São Paulo"),
                Division::new("RJ", "Rio de Janeiro"),
            ]
        );
    }

    #[tokio::test]
    async fn test_sub_divisions_for_state() {
        let cities = client().await.sub_divisions("SP").await.unwrap();
        assert_eq!(cities, vec![SubDivision::new(3509502, "Campinas")]);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let err = client().await.sub_divisions("XX").await.unwrap_err();
        match err {
            ClientError::Status { status, .. } => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let client =
            IbgeClient::new("http://localhost/api/v1/localidades", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(&["estados", "SP", "municipios"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost/api/v1/localidades/estados/SP/municipios?orderBy=nome"
        );
    }
}
