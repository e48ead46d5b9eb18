//! 单目标探测器实现
//!
//! 对单个目标执行一次健康探测：域名解析、可达性检测、HTTP状态与延迟采集

use crate::error::{ProbeError, Result};
use crate::probe::result::{ProbeResult, ProbeStatus, Target};
use async_trait::async_trait;
use reqwest::Client;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// 探测器trait，定义单目标探测接口
#[async_trait]
pub trait Prober: Send + Sync {
    /// 对单个目标执行一次探测
    ///
    /// 探测内部的任何失败都会被降级为OFFLINE结果，不向上抛出，
    /// 单次探测不做重试，重试由下一个调度周期负责。
    ///
    /// # 参数
    /// * `target` - 监控目标
    /// * `probe_timeout` - 单次探测超时
    ///
    /// # 返回
    /// * `ProbeResult` - 探测结果
    async fn probe(&self, target: &Target, probe_timeout: Duration) -> ProbeResult;
}

/// HTTP探测器实现
pub struct HttpProber {
    /// HTTP客户端
    client: Client,
}

impl HttpProber {
    /// 创建新的HTTP探测器
    ///
    /// # 返回
    /// * `Result<Self>` - 探测器实例
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(ProbeError::RequestError)?;

        Ok(Self { client })
    }

    /// 从URL推导可达性检测端口
    fn probe_port(target: &Target) -> u16 {
        reqwest::Url::parse(&target.url)
            .ok()
            .and_then(|url| url.port_or_known_default())
            .unwrap_or(443)
    }

    /// 解析目标主机
    ///
    /// # 参数
    /// * `host` - 主机名
    /// * `port` - 端口
    ///
    /// # 返回
    /// * `Result<SocketAddr, ProbeError>` - 解析出的第一个地址
    async fn resolve(&self, host: &str, port: u16) -> std::result::Result<SocketAddr, ProbeError> {
        let mut addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|_| ProbeError::ResolutionFailed {
                host: host.to_string(),
            })?;

        addrs.next().ok_or_else(|| ProbeError::ResolutionFailed {
            host: host.to_string(),
        })
    }

    /// 在超时内测试地址可达性
    async fn is_reachable(&self, addr: SocketAddr, probe_timeout: Duration) -> bool {
        matches!(timeout(probe_timeout, TcpStream::connect(addr)).await, Ok(Ok(_)))
    }

    /// 执行HTTP GET并采集状态码与延迟
    async fn http_get(
        &self,
        url: &str,
        probe_timeout: Duration,
    ) -> std::result::Result<(u16, Duration), ProbeError> {
        let start = Instant::now();

        let response = timeout(probe_timeout, self.client.get(url).send())
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(ProbeError::RequestError)?;

        Ok((response.status().as_u16(), start.elapsed()))
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &Target, probe_timeout: Duration) -> ProbeResult {
        let port = Self::probe_port(target);

        // 域名解析失败是本周期的终态，不重试
        let addr = match self.resolve(&target.host, port).await {
            Ok(addr) => addr,
            Err(e) => {
                warn!("{}", e);
                return ProbeResult::new(target, ProbeStatus::Offline)
                    .with_failure_reason(e.to_string());
            }
        };

        // 不可达是正常的稳定状态，不附带失败原因
        if !self.is_reachable(addr, probe_timeout).await {
            info!("{} 离线", target.host);
            return ProbeResult::new(target, ProbeStatus::Offline);
        }

        // 可达后GET失败归类为探测I/O失败，记录但不致命
        match self.http_get(&target.url, probe_timeout).await {
            Ok((code, latency)) => {
                debug!("{} 在线，状态码 {}，延迟 {}ms", target.host, code, latency.as_millis());
                ProbeResult::new(target, ProbeStatus::Online)
                    .with_response_code(code)
                    .with_latency(latency)
            }
            Err(e) => {
                warn!("探测I/O失败 {}: {}", target.url, e);
                ProbeResult::new(target, ProbeStatus::Offline)
                    .with_failure_reason(e.to_string())
            }
        }
    }
}
