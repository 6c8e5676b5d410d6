use pathcoach_core::CoachError;
use std::fmt;
use thiserror::Error;

/// Which external API a request went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Text,
    Music,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Text => f.write_str("text-generation API"),
            Service::Music => f.write_str("music-generation API"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Coach(#[from] CoachError),

    #[error("the text-generation account has run out of quota: top up the balance, then try again")]
    InsufficientQuota,

    #[error("the {0} rejected the API key: check it and run 'pathcoach key set'")]
    InvalidApiKey(Service),

    #[error("the {0} is rate limiting requests: wait a minute and try again")]
    RateLimited(Service),

    #[error("the {service} rejected the request (HTTP {status}): {message}")]
    Rejected {
        service: Service,
        status: u16,
        message: String,
    },

    #[error("request to the {service} timed out after {secs}s: try again later")]
    Timeout { service: Service, secs: u64 },

    #[error("could not reach the {service}: check your network connection")]
    Network {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build the HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl AgentError {
    /// Errors worth another attempt under a retry policy.
    pub fn is_transient(&self) -> bool {
        match self {
            AgentError::RateLimited(_)
            | AgentError::Timeout { .. }
            | AgentError::Network { .. } => true,
            AgentError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn from_transport(service: Service, timeout_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AgentError::Timeout {
                service,
                secs: timeout_secs,
            }
        } else {
            AgentError::Network {
                service,
                source: err,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(AgentError::RateLimited(Service::Text).is_transient());
        assert!(AgentError::Timeout {
            service: Service::Music,
            secs: 30
        }
        .is_transient());
        assert!(AgentError::Rejected {
            service: Service::Music,
            status: 503,
            message: "busy".into()
        }
        .is_transient());
        assert!(!AgentError::Rejected {
            service: Service::Music,
            status: 400,
            message: "bad".into()
        }
        .is_transient());
        assert!(!AgentError::InsufficientQuota.is_transient());
        assert!(!AgentError::InvalidApiKey(Service::Text).is_transient());
    }

    #[test]
    fn messages_name_the_remedy() {
        let msg = AgentError::Timeout {
            service: Service::Text,
            secs: 30,
        }
        .to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("text-generation API"));
        assert!(AgentError::InvalidApiKey(Service::Music)
            .to_string()
            .contains("pathcoach key set"));
    }
}
