use crate::config::{Config, ConfigError};
use std::net::SocketAddr;

/// One configured forwarder: queries whose name ends with `pattern` are
/// relayed to `address` instead of the recursors.
#[derive(Debug, Clone)]
pub struct ForwardRule {
    /// Config key, carried for logging only.
    pub name: String,
    pub pattern: String,
    pub address: SocketAddr,
    /// Hard cap on answer records, 0 = unlimited. Truncation keeps the
    /// leading records and never reorders.
    pub limit: usize,
}

impl ForwardRule {
    /// Case-sensitive suffix match against the fully-qualified query name.
    pub fn matches(&self, qname: &str) -> bool {
        qname.ends_with(&self.pattern)
    }
}

/// The immutable routing table. Built once at startup from a validated
/// [`Config`], then shared read-only by every in-flight request.
#[derive(Debug)]
pub struct RoutingTable {
    listen: SocketAddr,
    recursors: Vec<SocketAddr>,
    rules: Vec<ForwardRule>,
}

impl RoutingTable {
    /// Rules are sorted by descending pattern length so that lookup is
    /// deterministic and the most specific suffix wins, regardless of the
    /// config map's iteration order.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let listen = config
            .server
            .listen
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Validation(format!("bad listen address {}", config.server.listen)))?;

        let mut recursors = Vec::with_capacity(config.upstream.recursors.len());
        for addr in &config.upstream.recursors {
            recursors.push(
                addr.parse::<SocketAddr>()
                    .map_err(|_| ConfigError::Validation(format!("bad recursor address {addr}")))?,
            );
        }
        if recursors.is_empty() {
            return Err(ConfigError::Validation(
                "at least one recursor is required".to_string(),
            ));
        }

        let mut rules = Vec::with_capacity(config.forwarders.len());
        for (name, forwarder) in &config.forwarders {
            let address = forwarder.address.parse::<SocketAddr>().map_err(|_| {
                ConfigError::Validation(format!(
                    "bad address {} for forwarder {name}",
                    forwarder.address
                ))
            })?;
            rules.push(ForwardRule {
                name: name.clone(),
                pattern: forwarder.pattern.clone(),
                address,
                limit: forwarder.limit,
            });
        }
        rules.sort_by(|a, b| {
            b.pattern
                .len()
                .cmp(&a.pattern.len())
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(Self {
            listen,
            recursors,
            rules,
        })
    }

    /// Longest-suffix match over the forward rules.
    pub fn find_rule(&self, qname: &str) -> Option<&ForwardRule> {
        self.rules.iter().find(|rule| rule.matches(qname))
    }

    pub fn recursors(&self) -> &[SocketAddr] {
        &self.recursors
    }

    pub fn listen(&self) -> SocketAddr {
        self.listen
    }

    pub fn rules(&self) -> &[ForwardRule] {
        &self.rules
    }
}
