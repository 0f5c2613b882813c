/*!
 * 速率限制中间件
 *
 * 固定窗口计数：同一个键在 `window_secs` 内最多放行 `max_requests` 次，超出返回 429。
 * 已认证请求按用户 ID 计数，其余按客户端 IP。
 *
 * ```rust,ignore
 * web::scope("/api/v1/auth")
 *     .service(web::resource("/login").route(web::post().to(login)).wrap(RateLimit::login()))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 键: 前缀:身份，值: (窗口起点秒, 计数)
static RATE_LIMIT_CACHE: Lazy<Cache<String, (i64, u32)>> = Lazy::new(|| {
    Cache::builder()
        .time_to_idle(Duration::from_secs(600))
        .max_capacity(100_000)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window_secs: u64,
    key_prefix: String,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            key_prefix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// 登录：5 次/分钟
    pub fn login() -> Self {
        Self::new(5, 60).with_prefix("login")
    }

    /// 注册：3 次/分钟
    pub fn register() -> Self {
        Self::new(3, 60).with_prefix("register")
    }

    /// 刷新令牌：10 次/分钟
    pub fn refresh_token() -> Self {
        Self::new(10, 60).with_prefix("refresh")
    }

    /// 提交互评：30 次/分钟
    pub fn evaluation_submit() -> Self {
        Self::new(30, 60).with_prefix("evaluation_submit")
    }

    /// 催评提醒：2 次/10 分钟
    pub fn reminder() -> Self {
        Self::new(2, 600).with_prefix("reminder")
    }

    /// 通用 API：100 次/分钟
    pub fn api() -> Self {
        Self::new(100, 60).with_prefix("api")
    }

    fn cache_key(&self, identifier: &str) -> String {
        if self.key_prefix.is_empty() {
            identifier.to_string()
        } else {
            format!("{}:{}", self.key_prefix, identifier)
        }
    }
}

/// 在窗口内计数，返回 (是否放行, 新状态, 窗口剩余秒数)
fn admit(
    entry: Option<(i64, u32)>,
    now: i64,
    max_requests: u32,
    window_secs: u64,
) -> (bool, (i64, u32), u64) {
    let window = window_secs as i64;
    let (start, count) = match entry {
        Some((start, count)) if now - start < window => (start, count),
        _ => (now, 0),
    };
    let reset = (start + window - now).max(0) as u64;

    if count >= max_requests {
        (false, (start, count), reset)
    } else {
        (true, (start, count + 1), reset)
    }
}

/// 从请求中提取客户端 IP
///
/// 安全注意事项：
/// - 如果服务部署在反向代理后面，需要在反向代理中配置正确的 X-Forwarded-For / X-Real-IP 头
/// - 此实现会验证 IP 格式，防止伪造的无效头导致问题
/// - 在不可信网络中直接暴露服务时，攻击者可能伪造转发头来绕过限制
fn extract_client_ip(req: &ServiceRequest) -> String {
    // 尝试从连接信息获取真实 IP（最可信）
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    // 如果连接信息有有效 IP，优先使用
    if let Some(ref ip) = connection_ip
        && is_valid_ip(ip)
    {
        return ip.clone();
    }

    // 从 X-Forwarded-For 头获取（用于反向代理场景）
    // 只取第一个 IP（最接近客户端的）
    if let Some(forwarded) = req.headers().get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    // 从 X-Real-IP 头获取
    if let Some(real_ip) = req.headers().get("X-Real-IP")
        && let Ok(ip) = real_ip.to_str()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    // 如果都没有有效 IP，使用连接信息的默认值
    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

/// 验证 IP 地址格式是否有效
fn is_valid_ip(ip: &str) -> bool {
    use std::net::IpAddr;
    ip.parse::<IpAddr>().is_ok()
}

/// 从请求中提取用户 ID（如果已认证）
fn extract_user_id(req: &ServiceRequest) -> Option<i64> {
    req.extensions().get::<User>().map(|user| user.id)
}

/// 创建速率限制错误响应
fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            config: Rc::new(self.clone()),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    config: Rc<RateLimit>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let identifier = extract_user_id(&req)
                .map(|id| format!("user:{id}"))
                .unwrap_or_else(|| format!("ip:{}", extract_client_ip(&req)));
            let cache_key = config.cache_key(&identifier);

            let now = chrono::Utc::now().timestamp();
            let entry = RATE_LIMIT_CACHE.get(&cache_key).await;
            let (allowed, updated, reset) =
                admit(entry, now, config.max_requests, config.window_secs);

            if !allowed {
                warn!(
                    "Rate limit exceeded for key: {} ({}/{})",
                    cache_key, updated.1, config.max_requests
                );
                return Ok(
                    req.into_response(create_rate_limit_response(reset).map_into_right_body())
                );
            }

            RATE_LIMIT_CACHE.insert(cache_key, updated).await;

            req.extensions_mut().insert(RateLimitInfo {
                remaining: config.max_requests.saturating_sub(updated.1),
                limit: config.max_requests,
                reset,
            });

            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}

/// 速率限制信息（可在响应中添加）
#[derive(Clone)]
pub struct RateLimitInfo {
    pub remaining: u32,
    pub limit: u32,
    pub reset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window_secs, 60);
        assert_eq!(login.cache_key("ip:1.2.3.4"), "login:ip:1.2.3.4");

        let reminder = RateLimit::reminder();
        assert_eq!(reminder.max_requests, 2);
        assert_eq!(reminder.window_secs, 600);
    }

    #[test]
    fn test_fixed_window_counting() {
        let (ok, state, reset) = admit(None, 1_000, 2, 60);
        assert!(ok);
        assert_eq!(state, (1_000, 1));
        assert_eq!(reset, 60);

        let (ok, state, _) = admit(Some(state), 1_010, 2, 60);
        assert!(ok);
        assert_eq!(state, (1_000, 2));

        let (ok, _, reset) = admit(Some(state), 1_020, 2, 60);
        assert!(!ok);
        assert_eq!(reset, 40);

        // 窗口过期后重新计数
        let (ok, state, _) = admit(Some(state), 1_060, 2, 60);
        assert!(ok);
        assert_eq!(state, (1_060, 1));
    }
}
