//! Blocking HTTPS test server backed by generated certificates.
//!
//! Every connection gets its own thread and a `StreamOwned<ServerConnection,
//! TcpStream>`; the server reads the request head and answers with a fixed
//! JSON body. Handshakes the client aborts (untrusted certificate) just end
//! that connection.

use std::error::Error;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use rcgen::{BasicConstraints, CertificateParams, CertifiedKey, DnType, IsCa, KeyPair};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, ServerConnection, StreamOwned};

const SERVER_NAMES: [&str; 2] = ["127.0.0.1", "localhost"];

/// A server certificate plus the PEM a client has to trust to accept it.
pub struct TestPki {
    /// Root to hand to clients: the CA for [`TestPki::ca_signed`], the leaf
    /// itself for [`TestPki::self_signed`].
    pub trust_pem: String,
    cert: CertificateDer<'static>,
    key: Vec<u8>,
}

impl TestPki {
    /// Server certificate for `127.0.0.1`/`localhost` issued by a fresh CA.
    pub fn ca_signed() -> Result<Self, rcgen::Error> {
        let ca_key = KeyPair::generate()?;
        let mut ca_params = CertificateParams::new(Vec::<String>::new())?;
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        ca_params
            .distinguished_name
            .push(DnType::CommonName, "mock-server test CA");
        let ca_cert = ca_params.self_signed(&ca_key)?;

        let leaf_key = KeyPair::generate()?;
        let mut leaf_params = CertificateParams::new(server_names())?;
        leaf_params
            .distinguished_name
            .push(DnType::CommonName, "mock-server");
        let leaf = leaf_params.signed_by(&leaf_key, &ca_cert, &ca_key)?;

        Ok(Self {
            trust_pem: ca_cert.pem(),
            cert: leaf.der().clone(),
            key: leaf_key.serialize_der(),
        })
    }

    /// Self-signed server certificate for `127.0.0.1`/`localhost`.
    pub fn self_signed() -> Result<Self, rcgen::Error> {
        let CertifiedKey { cert, key_pair } = rcgen::generate_simple_self_signed(server_names())?;
        Ok(Self {
            trust_pem: cert.pem(),
            cert: cert.der().clone(),
            key: key_pair.serialize_der(),
        })
    }

    pub fn server_config(&self) -> Result<Arc<ServerConfig>, rustls::Error> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key.clone()));
        let config = ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(vec![self.cert.clone()], key)?;
        Ok(Arc::new(config))
    }
}

fn server_names() -> Vec<String> {
    SERVER_NAMES.iter().map(|name| name.to_string()).collect()
}

/// Listen on a random loopback port and answer every HTTPS request with
/// `200 OK` and `body` as JSON. Runs until the process exits.
pub fn spawn_tls_server(
    config: Arc<ServerConfig>,
    body: &'static str,
) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let config = Arc::clone(&config);
            thread::spawn(move || {
                if let Err(err) = serve_connection(config, stream, body) {
                    tracing::debug!(%err, "tls connection closed with error");
                }
            });
        }
    });

    Ok(addr)
}

fn serve_connection(
    config: Arc<ServerConfig>,
    stream: TcpStream,
    body: &str,
) -> Result<(), Box<dyn Error>> {
    let conn = ServerConnection::new(config)?;
    let mut tls = StreamOwned::new(conn, stream);

    // The handshake runs on the first read.
    let mut reader = BufReader::new(&mut tls);
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" {
            break;
        }
    }
    drop(reader);

    write!(
        tls,
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )?;
    tls.conn.send_close_notify();
    tls.flush()?;
    Ok(())
}
