use envconfig::Envconfig;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "BIND_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "BIND_PORT", default = "3305")]
    pub port: u16,

    /// Comma-separated list of etcd endpoints.
    #[envconfig(from = "ETCD_ENDPOINTS", default = "http://localhost:2379")]
    pub etcd_endpoints: String,

    #[envconfig(from = "ETCD_KEY_PREFIX", default = "/device-registry/")]
    pub etcd_key_prefix: String,

    /// See spec §4.3: gateway-count threshold above which the resolver
    /// switches to the last-known-gateway-first lookup strategy.
    #[envconfig(from = "GATEWAY_QUERY_THRESHOLD", default = "3")]
    pub gateway_query_threshold: usize,

    /// Upper bound on the `remote-cache-connection` readiness probe (spec §4.4).
    #[envconfig(from = "HEALTH_CHECK_TIMEOUT_MS", default = "1000")]
    pub health_check_timeout_ms: u64,
}

impl Config {
    pub fn bind(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn etcd_endpoints(&self) -> Vec<String> {
        self.etcd_endpoints
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
