//! Newline-delimited JSON framing shared by the listener and the gossip client.

use crate::domain::errors::FrameError;
use shared_types::{Message, MAX_MESSAGE_BYTES};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read the next message. `Ok(None)` at a clean end of stream.
///
/// Blank lines are skipped. A malformed line consumes exactly that line and
/// reports [`FrameError::Protocol`], so the caller may keep reading.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<Message>, FrameError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let mut line = Vec::new();
        // Room for a full-size payload plus its terminator.
        let read = (&mut *reader)
            .take(MAX_MESSAGE_BYTES as u64 + 1)
            .read_until(b'\n', &mut line)
            .await?;
        if read == 0 {
            return Ok(None);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.len() > MAX_MESSAGE_BYTES {
            return Err(FrameError::TooLong {
                limit: MAX_MESSAGE_BYTES,
            });
        }
        let text = String::from_utf8_lossy(&line);
        if text.trim().is_empty() {
            continue;
        }
        return Ok(Some(Message::decode(&text)?));
    }
}

/// Write one message as a single line and flush.
pub async fn write_message<W>(writer: &mut W, message: &Message) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let line = message.encode_line()?;
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::PeerAddress;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_reads_several_messages_per_stream() {
        let input = b"{\"type\":\"mineRequest\"}\n\n{\"type\":\"getBalance\",\"data\":\"bob\"}\n";
        let mut reader = BufReader::new(&input[..]);
        assert_eq!(
            read_message(&mut reader).await.unwrap(),
            Some(Message::MineRequest)
        );
        assert_eq!(
            read_message(&mut reader).await.unwrap(),
            Some(Message::GetBalance { data: "bob".into() })
        );
        assert_eq!(read_message(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_final_line_without_newline_is_read() {
        let mut reader = BufReader::new(&b"{\"type\":\"requestBlockchain\"}"[..]);
        assert_eq!(
            read_message(&mut reader).await.unwrap(),
            Some(Message::RequestBlockchain)
        );
    }

    #[tokio::test]
    async fn test_malformed_line_is_recoverable() {
        let input = b"{garbage\n{\"type\":\"mineRequest\"}\n";
        let mut reader = BufReader::new(&input[..]);
        let err = read_message(&mut reader).await.unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(
            read_message(&mut reader).await.unwrap(),
            Some(Message::MineRequest)
        );
    }

    #[tokio::test]
    async fn test_oversized_line_is_fatal() {
        let input = vec![b'a'; MAX_MESSAGE_BYTES + 10];
        let mut reader = BufReader::new(&input[..]);
        let err = read_message(&mut reader).await.unwrap_err();
        assert!(matches!(err, FrameError::TooLong { .. }));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_line_at_exact_limit_is_accepted() {
        let mut input = br#"{"type":"mineRequest"}"#.to_vec();
        input.resize(MAX_MESSAGE_BYTES, b' ');
        input.push(b'\n');
        input.extend_from_slice(b"{\"type\":\"requestBlockchain\"}\n");
        let mut reader = BufReader::new(&input[..]);
        assert_eq!(
            read_message(&mut reader).await.unwrap(),
            Some(Message::MineRequest)
        );
        assert_eq!(
            read_message(&mut reader).await.unwrap(),
            Some(Message::RequestBlockchain)
        );
    }

    #[tokio::test]
    async fn test_line_one_past_limit_is_fatal() {
        let mut input = br#"{"type":"mineRequest"}"#.to_vec();
        input.resize(MAX_MESSAGE_BYTES + 1, b' ');
        input.push(b'\n');
        let mut reader = BufReader::new(&input[..]);
        assert!(matches!(
            read_message(&mut reader).await,
            Err(FrameError::TooLong { .. })
        ));
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let message = Message::GetPeers {
            requester: PeerAddress::new("10.0.0.5", 6001),
        };
        let mut buf = Vec::new();
        write_message(&mut buf, &message).await.unwrap();
        assert_eq!(buf.last(), Some(&b'\n'));
        let mut reader = BufReader::new(&buf[..]);
        assert_eq!(read_message(&mut reader).await.unwrap(), Some(message));
    }
}
