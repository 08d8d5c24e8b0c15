use comms::{Endpoint, NetTransport, Role, Transport};
use rand::Rng;
use tokio::io::{self, AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};

type Pipe = Transport<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

fn transport_pair(size: usize) -> (Pipe, Pipe) {
    let (one, two) = io::duplex(size);
    let (rx1, tx1) = io::split(one);
    let (rx2, tx2) = io::split(two);
    (Transport::new(rx1, tx1), Transport::new(rx2, tx2))
}

#[tokio::test]
async fn send_recv() -> io::Result<()> {
    let (mut a, mut b) = transport_pair(128);

    let sent = a.send(b"Hello, world!").await?;
    assert_eq!(sent, 13);

    let msg = b.recv().await?;
    assert_eq!(msg.as_deref(), Some(&b"Hello, world!"[..]));
    Ok(())
}

#[tokio::test]
async fn empty_message_is_not_end_of_stream() -> io::Result<()> {
    let (mut a, mut b) = transport_pair(64);

    a.send(&[]).await?;
    a.shutdown().await?;

    assert_eq!(b.recv().await?, Some(Vec::new()));
    assert_eq!(b.recv().await?, None);
    Ok(())
}

#[tokio::test]
async fn large_payloads_survive_short_reads() -> io::Result<()> {
    // The pipe is much smaller than the payload, forcing partial reads/writes.
    let (mut a, mut b) = transport_pair(16);

    let payload: Vec<u8> = (0..10_000).map(|_| rand::rng().random()).collect();
    let expected = payload.clone();

    let send = async move {
        a.send(&payload).await?;
        a.shutdown().await
    };

    let recv = async move {
        let got = b.recv().await?;
        let end = b.recv().await?;
        Ok::<_, io::Error>((got, end))
    };

    let ((), (got, end)) = tokio::try_join!(send, recv)?;
    assert_eq!(got, Some(expected));
    assert_eq!(end, None);
    Ok(())
}

#[tokio::test]
async fn messages_keep_their_boundaries_and_order() -> io::Result<()> {
    let (mut a, mut b) = transport_pair(4096);

    // Payloads that look like length prefixes must not confuse the framing.
    let msgs: [&[u8]; 4] = [&[0, 0, 0, 9], &[], &[0xff; 300], &[0, 0, 0, 0, 1]];
    for msg in msgs {
        a.send(msg).await?;
    }

    let mut buf = Vec::new();
    for msg in msgs {
        let got = b.recv_into(&mut buf).await?;
        assert_eq!(got, Some(msg));
    }
    Ok(())
}

#[tokio::test]
async fn truncated_prefix_is_an_error() -> io::Result<()> {
    let (one, two) = io::duplex(64);
    let (_, mut raw_tx) = io::split(one);
    let (rx, tx) = io::split(two);
    let mut b = Transport::new(rx, tx);

    raw_tx.write_all(&[0, 0]).await?;
    raw_tx.shutdown().await?;

    let err = b.recv().await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    Ok(())
}

#[tokio::test]
async fn truncated_payload_is_an_error() -> io::Result<()> {
    let (one, two) = io::duplex(64);
    let (_, mut raw_tx) = io::split(one);
    let (rx, tx) = io::split(two);
    let mut b = Transport::new(rx, tx);

    raw_tx.write_all(&[0, 0, 0, 10, 1, 2, 3]).await?;
    raw_tx.shutdown().await?;

    let err = b.recv().await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    Ok(())
}

#[tokio::test]
async fn prefix_is_big_endian() -> io::Result<()> {
    let (one, two) = io::duplex(512);
    let (_, mut raw_tx) = io::split(one);
    let (rx, tx) = io::split(two);
    let mut b = Transport::new(rx, tx);

    raw_tx.write_all(&[0, 0, 1, 2]).await?;
    raw_tx.write_all(&[7; 258]).await?;

    assert_eq!(b.recv().await?, Some(vec![7; 258]));
    Ok(())
}

#[tokio::test]
async fn loopback_bootstrap() -> io::Result<()> {
    // Reserve a free port, then release it for the server to bind.
    let port = std::net::TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();

    let server = tokio::spawn(async move {
        let endpoint = Endpoint::new("127.0.0.1", port, Role::Server);
        let mut transport = NetTransport::connect(&endpoint).await?;
        let got = transport.recv().await?;
        transport.send(b"ack").await?;
        Ok::<_, io::Error>(got)
    });

    let endpoint = Endpoint::new("127.0.0.1", port, Role::Client);
    let mut client = loop {
        match NetTransport::connect(&endpoint).await {
            Ok(t) => break t,
            Err(_) => tokio::task::yield_now().await,
        }
    };

    assert!(client.peer().is_some());
    client.send(b"frame").await?;
    assert_eq!(client.recv().await?, Some(b"ack".to_vec()));

    let got = server.await.unwrap()?;
    assert_eq!(got, Some(b"frame".to_vec()));
    Ok(())
}

#[tokio::test]
async fn client_fails_fast_without_a_listener() -> io::Result<()> {
    let port = std::net::TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();
    let endpoint = Endpoint::new("127.0.0.1", port, Role::Client);

    let err = NetTransport::connect(&endpoint).await.err().unwrap();
    assert_eq!(err.role, Role::Client);
    assert_eq!(err.addr, format!("127.0.0.1:{port}"));
    Ok(())
}
