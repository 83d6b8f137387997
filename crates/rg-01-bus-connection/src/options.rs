//! Translating a `BrokerConfig` into client options.

use rumqttc::{MqttOptions, TlsConfiguration, Transport};
use tracing::{error, info};

use crate::config::BrokerConfig;
use crate::tls::{TlsError, TlsMaterial};

/// How the transport ended up configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsState {
    /// TLS not requested.
    Disabled,
    /// TLS requested and material loaded.
    Enabled,
    /// TLS requested but material unreadable; connecting without it.
    Degraded(TlsError),
}

/// Build client options. Never fails: unreadable TLS material is logged and
/// the options are returned without a TLS transport.
pub fn build_mqtt_options(config: &BrokerConfig) -> (MqttOptions, TlsState) {
    let mut options = MqttOptions::new(
        config.client_id.clone(),
        config.address.host.clone(),
        config.address.port,
    );
    options.set_keep_alive(config.keep_alive);
    options.set_clean_session(true);

    if let Some(creds) = &config.credentials {
        options.set_credentials(creds.username.clone(), creds.password.clone());
    }

    let state = match &config.tls {
        None => TlsState::Disabled,
        Some(tls) => match TlsMaterial::load(tls) {
            Ok(material) => {
                options.set_transport(Transport::tls_with_config(TlsConfiguration::Simple {
                    ca: material.ca,
                    alpn: None,
                    client_auth: Some((material.cert, material.key)),
                }));
                info!("[rg-01] TLS material loaded");
                TlsState::Enabled
            }
            Err(e) => {
                error!(error = %e, "[rg-01] Error loading TLS material; connecting without TLS");
                TlsState::Degraded(e)
            }
        },
    };

    (options, state)
}
