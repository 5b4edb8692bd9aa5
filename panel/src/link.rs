use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use smarthome_common::protocol::{decode_light_reply, Opcode, REPLY_ON};
use smarthome_common::LightStatus;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("no reply from the node within {0:?}")]
    Timeout(Duration),
    #[error("link i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Strict request/reply framing over any byte stream.
///
/// Every request is one opcode byte, plus one payload byte for the
/// commands that carry one, answered by exactly one reply byte. The
/// reply wait is bounded so a dead peer surfaces as [`LinkError::Timeout`]
/// instead of a hung panel.
pub struct CommandLink<S> {
    stream: S,
    timeout: Duration,
}

impl<S> CommandLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, timeout: Duration) -> Self {
        Self { stream, timeout }
    }

    /// Fire one command and return the raw reply byte.
    pub async fn exchange(&mut self, opcode: Opcode) -> Result<u8, LinkError> {
        debug_assert!(!opcode.has_payload());
        self.send(&[opcode.to_byte()]).await
    }

    /// Fire one command that carries a single payload byte.
    pub async fn exchange_with_payload(
        &mut self,
        opcode: Opcode,
        payload: u8,
    ) -> Result<u8, LinkError> {
        debug_assert!(opcode.has_payload());
        self.send(&[opcode.to_byte(), payload]).await
    }

    pub async fn query_on_off(&mut self, opcode: Opcode) -> Result<bool, LinkError> {
        Ok(self.exchange(opcode).await? == REPLY_ON)
    }

    pub async fn query_light(&mut self) -> Result<LightStatus, LinkError> {
        let reply = self.exchange(Opcode::GetLightStatus).await?;
        Ok(decode_light_reply(reply))
    }

    async fn send(&mut self, request: &[u8]) -> Result<u8, LinkError> {
        self.stream.write_all(request).await?;
        let mut reply = [0u8; 1];
        match tokio::time::timeout(self.timeout, self.stream.read_exact(&mut reply)).await {
            Ok(read) => {
                read?;
                Ok(reply[0])
            }
            Err(_) => Err(LinkError::Timeout(self.timeout)),
        }
    }
}
