// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::session::UserSession;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use parking_lot::RwLock;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// 认证错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    /// 令牌无法通过校验
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// 令牌主体与声明的用户不一致
    #[error("Token subject {actual} does not match user {expected}")]
    SubjectMismatch { expected: Uuid, actual: String },

    /// 令牌为空
    #[error("Empty token")]
    EmptyToken,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// 会话桥接服务
///
/// 保存宿主应用交给本进程的认证会话。实时订阅、队列处理和公司主页补全都通过它判断当前用户。
/// 克隆后共享同一份会话。
#[derive(Clone)]
pub struct SessionBridge {
    current: Arc<RwLock<Option<UserSession>>>,
    jwt_secret: Option<String>,
}

impl SessionBridge {
    /// 创建会话桥接服务
    ///
    /// # 参数
    ///
    /// * `jwt_secret` - 配置后对令牌做 HS256 校验，否则按不透明令牌处理
    pub fn new(jwt_secret: Option<String>) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            jwt_secret,
        }
    }

    /// 建立或刷新会话
    ///
    /// 校验失败时清空已有会话
    ///
    /// # 返回值
    ///
    /// * `Ok(UserSession)` - 新会话
    /// * `Err(AuthError)` - 令牌被拒绝
    pub fn set_token(&self, token: String, user_id: Uuid) -> Result<UserSession, AuthError> {
        match self.verify(&token, user_id) {
            Ok(expires_at) => {
                let session = UserSession {
                    user_id,
                    token,
                    expires_at,
                };
                *self.current.write() = Some(session.clone());
                info!(user_id = %user_id, "Session established");
                Ok(session)
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Rejected session token");
                self.clear();
                Err(e)
            }
        }
    }

    fn verify(&self, token: &str, user_id: Uuid) -> Result<Option<DateTime<Utc>>, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::EmptyToken);
        }

        let Some(secret) = self.jwt_secret.as_deref() else {
            return Ok(None);
        };

        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.sub != user_id.to_string() {
            return Err(AuthError::SubjectMismatch {
                expected: user_id,
                actual: data.claims.sub,
            });
        }

        Ok(DateTime::from_timestamp(data.claims.exp, 0))
    }

    /// 当前有效会话，过期会话视为不存在
    pub fn current(&self) -> Option<UserSession> {
        let guard = self.current.read();
        guard
            .as_ref()
            .filter(|session| !session.is_expired(Utc::now()))
            .cloned()
    }

    /// 当前用户ID
    pub fn current_user(&self) -> Option<Uuid> {
        self.current().map(|session| session.user_id)
    }

    pub fn clear(&self) {
        *self.current.write() = None;
    }
}
