//! Decode-once codec for inbound server frames.
//!
//! - Frames are size-checked before any parsing
//! - Text is resolved through `Envelope<ServerMessage>` (exactly one variant)
//! - Outbound requests are encoded with their correlation id

use bytes::Bytes;

use relaywire_core::{
    error::{RelayError, Result},
    protocol::{
        ClientRequest, Envelope, ServerMessage, ServerResultResponse, ServerUpdateResponse,
    },
};

#[derive(Debug)]
pub enum Inbound {
    Response(ServerResultResponse),
    Update(ServerUpdateResponse),
}

pub fn decode(frame: Bytes, max_frame_bytes: usize) -> Result<Inbound> {
    if frame.len() > max_frame_bytes {
        return Err(RelayError::PayloadTooLarge);
    }

    let text = std::str::from_utf8(&frame)
        .map_err(|e| RelayError::BadRequest(format!("frame is not utf-8: {e}")))?;

    match Envelope::<ServerMessage>::parse(text)?.into_inner() {
        Some(ServerMessage::Response(r)) => Ok(Inbound::Response(r)),
        Some(ServerMessage::Update(u)) => Ok(Inbound::Update(u)),
        None => Err(RelayError::BadRequest("frame carries no message".into())),
    }
}

pub fn encode(req: &ClientRequest) -> Result<String> {
    req.to_json()
}
