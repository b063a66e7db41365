//! Session service endpoints.

use super::*;
use crate::model::TableSnapshot;

/// A download in progress; read it with [`Download::chunk`].
#[derive(Debug)]
pub struct Download {
    resp: reqwest::Response,
    base: String,
}

impl Download {
    /// File name suggested by the server, if any.
    pub fn file_name(&self) -> Option<String> {
        let disposition = self
            .resp
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)?
            .to_str()
            .ok()?;
        disposition.split(';').find_map(|part| {
            let value = part.trim().strip_prefix("filename=")?;
            let value = value.trim_matches('"').trim();
            (!value.is_empty()).then(|| value.to_string())
        })
    }

    pub async fn chunk(&mut self) -> Result<Option<Vec<u8>>, RemoteError> {
        let chunk = self
            .resp
            .chunk()
            .await
            .map_err(|e| RemoteError::transport(&self.base, e))?;
        Ok(chunk.map(|c| c.to_vec()))
    }
}

impl RemoteClient {
    pub async fn start_session(&self) -> Result<String, RemoteError> {
        let base = self.session_base.clone();
        tracing::debug!(%base, "starting session");
        let resp = self
            .client
            .post(self.session_url("/session/start"))
            .send()
            .await
            .map_err(|e| RemoteError::transport(&base, e))?;
        let resp = self.ensure_ok(resp, "Failed to start session").await?;
        let out: StartSessionResponse = self.parse_json(resp, &base).await?;

        if let Some(err) = out.error {
            return Err(RemoteError::Backend(err));
        }
        out.session_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| RemoteError::Backend("Failed to start session.".to_string()))
    }

    pub async fn upload(
        &self,
        session_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Ack, RemoteError> {
        let base = self.session_base.clone();
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self
            .client
            .post(self.session_url("/session/upload"))
            .query(&[("sessionId", session_id)])
            .multipart(form)
            .send()
            .await
            .map_err(|e| RemoteError::transport(&base, e))?;
        let resp = self.ensure_ok(resp, "Upload failed").await?;
        let ack: Ack = self.parse_json(resp, &base).await?;
        check_ack(ack, "Upload failed")
    }

    pub async fn open_local(&self, session_id: &str) -> Result<Ack, RemoteError> {
        let base = self.session_base.clone();
        let resp = self
            .client
            .get(self.session_url("/session/open-local"))
            .query(&[("sessionId", session_id)])
            .send()
            .await
            .map_err(|e| RemoteError::transport(&base, e))?;
        let resp = self.ensure_ok(resp, "Open failed").await?;
        let ack: Ack = self.parse_json(resp, &base).await?;
        check_ack(ack, "Open failed")
    }

    pub async fn table(&self, session_id: &str) -> Result<TableSnapshot, RemoteError> {
        let base = self.session_base.clone();
        let resp = self
            .client
            .get(self.session_url("/session/table"))
            .query(&[("sessionId", session_id)])
            .send()
            .await
            .map_err(|e| RemoteError::transport(&base, e))?;
        let resp = self.ensure_ok(resp, "Table fetch failed").await?;
        let out: TableResponse = self.parse_json(resp, &base).await?;

        if let Some(err) = out.error {
            return Err(RemoteError::Backend(err));
        }
        match (out.headers, out.rows) {
            (Some(headers), Some(rows)) => Ok(TableSnapshot::server_confirmed(headers, rows)),
            _ => Err(RemoteError::Protocol {
                url: base,
                detail: "table response is missing headers or rows".to_string(),
            }),
        }
    }

    pub async fn download(&self, session_id: &str) -> Result<Download, RemoteError> {
        let base = self.session_base.clone();
        let resp = self
            .client
            .get(self.session_url("/session/download"))
            .query(&[("sessionId", session_id)])
            .send()
            .await
            .map_err(|e| RemoteError::transport(&base, e))?;
        let resp = self.ensure_ok(resp, "Download failed").await?;
        Ok(Download { resp, base })
    }
}

fn check_ack(ack: Ack, fallback: &str) -> Result<Ack, RemoteError> {
    if let Some(err) = ack.error.clone().filter(|e| !e.trim().is_empty()) {
        return Err(RemoteError::Backend(err));
    }
    if !ack.success {
        return Err(RemoteError::Backend(fallback.to_string()));
    }
    Ok(ack)
}
