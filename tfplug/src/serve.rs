//! Plugin process entry point
//!
//! [`serve`] performs the go-plugin handshake Terraform expects from a
//! provider binary. It checks the magic cookie, listens on a loopback port,
//! prints the handshake line on stdout and serves gRPC until interrupted.
//! Under `debug` the provider runs standalone and prints a
//! `TF_REATTACH_PROVIDERS` value for Terraform to attach to instead.

use crate::error::{Result, TfplugError};
use crate::grpc::GrpcProvider;
use crate::proto::ProviderServiceServer;
use crate::provider::Provider;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use std::io::Write;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Identity, Server, ServerTlsConfig};

pub const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
pub const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

const CORE_PROTOCOL_VERSION: u32 = 1;
const PROTOCOL_VERSION: u32 = 6;

/// How the provider process is served
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Registry address, e.g. `registry.terraform.io/telnyx/telnyx`
    pub provider_address: String,
    /// Run standalone and print reattach details instead of the handshake
    pub debug: bool,
    pub max_message_size: usize,
}

impl ServeConfig {
    pub fn new(provider_address: &str) -> Self {
        Self {
            provider_address: provider_address.to_string(),
            debug: false,
            max_message_size: 256 << 20, // 256MB
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }
}

/// Serves `provider` over gRPC until Ctrl-C or until Terraform kills the
/// process
pub async fn serve<P: Provider + 'static>(provider: P, config: ServeConfig) -> Result<()> {
    if !config.debug {
        check_launch_env(
            std::env::var(MAGIC_COOKIE_KEY).ok().as_deref(),
            std::env::var("PLUGIN_PROTOCOL_VERSIONS").ok().as_deref(),
        )?;
    }

    let service = ProviderServiceServer::new(GrpcProvider::new(provider))
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let mut builder = Server::builder();
    let mut server_cert = None;
    if !config.debug && std::env::var_os("PLUGIN_CLIENT_CERT").is_some() {
        let tls = self_signed_tls()?;
        builder = builder.tls_config(tls.config)?;
        server_cert = Some(tls.cert_der);
    }

    let mut stdout = std::io::stdout();
    if config.debug {
        writeln!(
            stdout,
            "Provider started. To attach Terraform, set TF_REATTACH_PROVIDERS to:\n\n\t{}\n",
            reattach_value(&config.provider_address, addr, std::process::id())
        )?;
    } else {
        writeln!(stdout, "{}", handshake_line(addr, server_cert.as_deref()))?;
    }
    stdout.flush()?;

    tracing::info!("Provider listening on {}", addr);

    builder
        .add_service(service)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("Provider server stopped");
    Ok(())
}

fn check_launch_env(cookie: Option<&str>, protocol_versions: Option<&str>) -> Result<()> {
    if cookie != Some(MAGIC_COOKIE_VALUE) {
        return Err(TfplugError::ServerError(
            "This binary is a plugin. These are not meant to be executed directly. \
             Please execute the program that consumes these plugins, which will \
             load any plugins automatically"
                .to_string(),
        ));
    }

    // Older Terraform releases do not send the list at all
    let Some(versions) = protocol_versions else {
        return Ok(());
    };
    let supported = versions
        .split(',')
        .any(|v| v.trim().parse::<u32>() == Ok(PROTOCOL_VERSION));
    if !supported {
        return Err(TfplugError::ServerError(format!(
            "Terraform offered plugin protocol versions {}, this provider speaks {}",
            versions, PROTOCOL_VERSION
        )));
    }
    Ok(())
}

/// `CORE|APP|NETWORK|ADDR|PROTOCOL[|CERT]`, read by Terraform from stdout
fn handshake_line(addr: SocketAddr, cert_der: Option<&[u8]>) -> String {
    let mut line = format!(
        "{}|{}|tcp|{}|grpc",
        CORE_PROTOCOL_VERSION, PROTOCOL_VERSION, addr
    );
    if let Some(der) = cert_der {
        line.push('|');
        line.push_str(&STANDARD_NO_PAD.encode(der));
    }
    line
}

fn reattach_value(provider_address: &str, addr: SocketAddr, pid: u32) -> String {
    serde_json::json!({
        provider_address: {
            "Protocol": "grpc",
            "ProtocolVersion": PROTOCOL_VERSION,
            "Pid": pid,
            "Test": true,
            "Addr": {
                "Network": "tcp",
                "String": addr.to_string(),
            },
        }
    })
    .to_string()
}

struct SelfSignedTls {
    config: ServerTlsConfig,
    cert_der: Vec<u8>,
}

/// Fresh certificate for this process; Terraform pins it from the handshake
/// line. Terraform's own client certificate is a self-signed CA, which
/// webpki refuses as a client end-entity, so client auth is not requested.
fn self_signed_tls() -> Result<SelfSignedTls> {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
        .map_err(|e| TfplugError::TlsError(format!("Failed to generate certificate: {}", e)))?;

    let identity = Identity::from_pem(certified.cert.pem(), certified.key_pair.serialize_pem());

    Ok(SelfSignedTls {
        config: ServerTlsConfig::new().identity(identity),
        cert_der: certified.cert.der().to_vec(),
    })
}
