//! REST job store - PostgREST-style row API client.
//!
//! The datastore exposes tables as rows over HTTP: `GET
//! /rest/v1/jobs?id=eq.{id}&select=...` to read (with an embedded
//! `locations(secret)` join), `PATCH` with a JSON body to partially
//! update. Fields absent from the PATCH body are left untouched by the
//! server, which is exactly the `JobStore::update` contract.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use url::Url;

use crate::domain::errors::StoreError;
use crate::domain::ids::JobId;
use crate::domain::job::JobRecord;
use crate::ports::job_store::{JobPatch, JobStore, JobWithSecret};

const JOBS_PATH: &str = "rest/v1/jobs";

/// Job row with the embedded location join.
#[derive(Debug, Deserialize)]
struct JoinedRow {
    #[serde(flatten)]
    record: JobRecord,
    locations: Option<SecretRow>,
}

#[derive(Debug, Deserialize)]
struct SecretRow {
    secret: String,
}

#[derive(Debug)]
pub struct RestJobStore {
    client: reqwest::Client,
    base_url: Url,
}

impl RestJobStore {
    /// Build a store client. The key is sent both as `apikey` and as a
    /// bearer token, which is what row-API datastores expect.
    pub fn new(base_url: Url, api_key: &str) -> Result<Self, StoreError> {
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| StoreError::Transport("datastore key is not a valid header value".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| StoreError::Transport("datastore key is not a valid header value".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Transport(format!("building datastore client: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn jobs_url(&self, id: JobId, select: Option<&str>) -> Result<Url, StoreError> {
        let mut url = self
            .base_url
            .join(JOBS_PATH)
            .map_err(|e| StoreError::Transport(format!("building jobs url: {e}")))?;

        let mut query = format!("id=eq.{}", id.as_ulid());
        if let Some(select) = select {
            query.push_str("&select=");
            query.push_str(select);
        }
        url.set_query(Some(&query));
        Ok(url)
    }

    async fn fetch_rows<T: for<'de> Deserialize<'de>>(
        &self,
        id: JobId,
        select: &str,
    ) -> Result<Option<T>, StoreError> {
        let url = self.jobs_url(id, Some(select))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("fetching job: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }

        let mut rows: Vec<T> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        // id is unique; the row API still answers with an array.
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }
}

#[async_trait]
impl JobStore for RestJobStore {
    async fn fetch_with_secret(&self, id: JobId) -> Result<Option<JobWithSecret>, StoreError> {
        let Some(row) = self
            .fetch_rows::<JoinedRow>(id, "*,locations(secret)")
            .await?
        else {
            return Ok(None);
        };

        let secret = row.locations.ok_or_else(|| {
            StoreError::Corrupt(format!(
                "job {id} references missing location {}",
                row.record.location_id
            ))
        })?;

        Ok(Some(JobWithSecret {
            record: row.record,
            location_secret: secret.secret,
        }))
    }

    async fn fetch(&self, id: JobId) -> Result<Option<JobRecord>, StoreError> {
        self.fetch_rows::<JobRecord>(id, "*").await
    }

    async fn update(&self, id: JobId, patch: JobPatch) -> Result<(), StoreError> {
        let url = self.jobs_url(id, None)?;
        let response = self
            .client
            .patch(url)
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("updating job: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }
        Ok(())
    }
}
