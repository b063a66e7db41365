//! Voice service endpoints.

use super::*;

impl RemoteClient {
    /// Forward raw command text to the remote parser/executor.
    pub async fn execute_text(&self, text: &str) -> Result<VoiceResponse, RemoteError> {
        let base = self.voice_base.clone();
        let resp = self
            .client
            .post(self.voice_url("/voice/text"))
            .json(&TextCommandRequest { text })
            .send()
            .await
            .map_err(|e| RemoteError::transport(&base, e))?;
        let resp = self.ensure_ok(resp, "Command failed").await?;
        let out: VoiceResponse = self.parse_json(resp, &base).await?;
        check_voice(out)
    }

    /// Ask the voice service to capture, transcribe and execute one utterance.
    pub async fn execute_voice(&self) -> Result<VoiceResponse, RemoteError> {
        let base = self.voice_base.clone();
        let resp = self
            .client
            .post(self.voice_url("/voice/command"))
            .send()
            .await
            .map_err(|e| RemoteError::transport(&base, e))?;
        let resp = self.ensure_ok(resp, "Voice command failed").await?;
        let out: VoiceResponse = self.parse_json(resp, &base).await?;
        check_voice(out)
    }
}

fn check_voice(out: VoiceResponse) -> Result<VoiceResponse, RemoteError> {
    match out.error.as_deref().map(str::trim) {
        Some(err) if !err.is_empty() => Err(RemoteError::Backend(err.to_string())),
        _ => Ok(out),
    }
}
