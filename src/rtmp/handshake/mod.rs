//! RTMP handshake (uncomplicated/"simple" variant, RTMP spec 5.2). Grounded
//! on `handshake/handshake.go`'s server-side state machine, minus the
//! Adobe digest negotiation — we always respond with the plain C2/S2 echo,
//! which every real client falls back to accepting (spec §4.1 "complete the
//! handshake"; the digest scheme is an anti-piracy handshake flavor with no
//! bearing on media correctness, so SPEC_FULL.md doesn't require it).

pub mod errors;

use std::time::Duration;

use byteorder::{BigEndian, WriteBytesExt};
use rand::RngCore;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use errors::HandshakeError;

pub const RTMP_VERSION: u8 = 3;
pub const HANDSHAKE_SIZE: usize = 1536;

/// Deadline applied to each individual read/write of the handshake (spec
/// §4.2: "Each read/write in the handshake is deadline-bounded").
const IO_TIMEOUT: Duration = Duration::from_secs(5);

async fn bounded<F, T>(fut: F) -> Result<T, HandshakeError>
where
    F: std::future::Future<Output = std::io::Result<T>>,
{
    timeout(IO_TIMEOUT, fut)
        .await
        .map_err(|_| HandshakeError::from(errors::HandshakeErrorValue::Timeout))?
        .map_err(HandshakeError::from)
}

/// Drives the server side of the handshake over any async duplex stream:
/// read C0+C1, write S0+S1+S2, read C2. Each read/write is individually
/// deadline-bounded so a stalled peer can't hold a connection open forever.
pub async fn perform_server_handshake<S>(io: &mut S) -> Result<(), HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut c0 = [0u8; 1];
    bounded(io.read_exact(&mut c0)).await?;
    if c0[0] != RTMP_VERSION {
        return Err(errors::HandshakeErrorValue::S0VersionNotCorrect.into());
    }

    let mut c1 = [0u8; HANDSHAKE_SIZE];
    bounded(io.read_exact(&mut c1)).await?;

    let mut s1 = Vec::with_capacity(HANDSHAKE_SIZE);
    s1.write_u32::<BigEndian>(0)?;
    s1.write_u32::<BigEndian>(0)?;
    let mut random = vec![0u8; HANDSHAKE_SIZE - 8];
    rand::thread_rng().fill_bytes(&mut random);
    s1.extend_from_slice(&random);

    bounded(io.write_all(&[RTMP_VERSION])).await?;
    bounded(io.write_all(&s1)).await?;
    bounded(io.write_all(&c1)).await?; // S2 echoes C1
    bounded(io.flush()).await?;

    let mut c2 = [0u8; HANDSHAKE_SIZE];
    bounded(io.read_exact(&mut c2)).await?;

    Ok(())
}

/// Drives the client side of the handshake: write C0+C1, read S0+S1+S2,
/// write C2 (the mirror of `perform_server_handshake`, spec §4.3).
pub async fn perform_client_handshake<S>(io: &mut S) -> Result<(), HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut c1 = Vec::with_capacity(HANDSHAKE_SIZE);
    c1.write_u32::<BigEndian>(0)?;
    c1.write_u32::<BigEndian>(0)?;
    let mut random = vec![0u8; HANDSHAKE_SIZE - 8];
    rand::thread_rng().fill_bytes(&mut random);
    c1.extend_from_slice(&random);

    bounded(io.write_all(&[RTMP_VERSION])).await?;
    bounded(io.write_all(&c1)).await?;
    bounded(io.flush()).await?;

    let mut s0 = [0u8; 1];
    bounded(io.read_exact(&mut s0)).await?;
    if s0[0] != RTMP_VERSION {
        return Err(errors::HandshakeErrorValue::S0VersionNotCorrect.into());
    }

    let mut s1 = [0u8; HANDSHAKE_SIZE];
    bounded(io.read_exact(&mut s1)).await?;

    bounded(io.write_all(&s1)).await?; // C2 echoes S1
    bounded(io.flush()).await?;

    let mut s2 = [0u8; HANDSHAKE_SIZE];
    bounded(io.read_exact(&mut s2)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn client_and_server_handshakes_complete_against_each_other() {
        let (mut client_io, mut server_io) = tokio::io::duplex(HANDSHAKE_SIZE * 4);

        let server = tokio::spawn(async move { perform_server_handshake(&mut server_io).await });
        perform_client_handshake(&mut client_io).await.unwrap();
        server.await.unwrap().unwrap();
    }
}
