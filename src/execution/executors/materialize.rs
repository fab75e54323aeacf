//! Response body materialization.
//!
//! Turns a [`ResponseBody`] into final bytes. Streams are drained through
//! pooled buffers; every buffer taken from the pool goes back on every exit
//! path, including cancellation of the future, because the loans are
//! [`PooledBuffer`](crate::utils::PooledBuffer) guards. The reader is owned
//! here and dropped (closing the underlying stream) before returning.

use crate::error::NetworkError;
use crate::types::ResponseBody;
use crate::types::response::BodyReader;
use crate::utils::{BufferPool, PooledWriter};
use bytes::Bytes;
use tokio::io::AsyncReadExt;

/// Materialize `body` into bytes.
///
/// Already-received bytes are returned as-is without copying; an absent body
/// yields an empty sequence.
pub async fn materialize(body: ResponseBody, pool: &BufferPool) -> Result<Bytes, NetworkError> {
    match body {
        ResponseBody::Empty => Ok(Bytes::new()),
        ResponseBody::Bytes(bytes) => Ok(bytes),
        ResponseBody::Stream {
            reader,
            content_length,
        } => read_stream(reader, content_length, pool).await,
    }
}

async fn read_stream(
    mut reader: BodyReader,
    content_length: Option<u64>,
    pool: &BufferPool,
) -> Result<Bytes, NetworkError> {
    let size_hint = content_length
        .map(|len| usize::try_from(len).unwrap_or(usize::MAX))
        .unwrap_or(0)
        .min(crate::defaults::body::MAX_PREALLOC);
    let mut out = PooledWriter::new(pool, size_hint);
    let mut chunk = pool.borrow(crate::defaults::body::READ_CHUNK);

    loop {
        let count = reader
            .read(&mut chunk)
            .await
            .map_err(|e| NetworkError::Io(e.to_string()))?;
        if count == 0 {
            break;
        }
        out.write(&chunk[..count]);
    }
    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, ReadBuf};

    /// Yields `data` then fails.
    struct FailingReader {
        data: Option<Vec<u8>>,
    }

    impl AsyncRead for FailingReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.data.take() {
                Some(data) => {
                    buf.put_slice(&data);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "reset mid-body",
                ))),
            }
        }
    }

    #[tokio::test]
    async fn empty_body_is_empty_bytes() {
        let pool = BufferPool::new(4096);
        let bytes = materialize(ResponseBody::Empty, &pool).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn zero_length_stream_is_empty_bytes() {
        let pool = BufferPool::new(4096);
        let body = ResponseBody::stream(tokio::io::empty(), Some(0));
        let bytes = materialize(body, &pool).await.unwrap();
        assert!(bytes.is_empty());
        assert_eq!(pool.outstanding(), 0);
    }

    #[tokio::test]
    async fn materialized_bytes_are_reused() {
        let pool = BufferPool::new(4096);
        let original = Bytes::from_static(b"already here");
        let bytes = materialize(ResponseBody::Bytes(original.clone()), &pool)
            .await
            .unwrap();
        assert_eq!(bytes.as_ptr(), original.as_ptr());
        assert_eq!(pool.outstanding(), 0);
    }

    #[tokio::test]
    async fn stream_is_drained_with_unknown_length() {
        let pool = BufferPool::new(64 * 1024);
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let body = ResponseBody::stream(io::Cursor::new(payload.clone()), None);

        let bytes = materialize(body, &pool).await.unwrap();
        assert_eq!(bytes.as_ref(), payload.as_slice());
        assert_eq!(pool.outstanding(), 0);
    }

    #[tokio::test]
    async fn read_failure_returns_buffers() {
        let pool = BufferPool::new(4096);
        let body = ResponseBody::stream(
            FailingReader {
                data: Some(vec![1; 300]),
            },
            Some(1000),
        );

        let err = materialize(body, &pool).await.unwrap_err();
        assert!(matches!(err, NetworkError::Io(_)));
        assert_eq!(pool.outstanding(), 0);
    }

    #[tokio::test]
    async fn cancelled_read_returns_buffers() {
        let pool = BufferPool::new(4096);
        let (_writer, reader) = tokio::io::duplex(64);
        let body = ResponseBody::stream(reader, Some(10));

        // the writer never sends, so the read stays pending until the timeout drops it
        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            materialize(body, &pool),
        )
        .await;
        assert!(outcome.is_err());
        assert_eq!(pool.outstanding(), 0);
    }
}
