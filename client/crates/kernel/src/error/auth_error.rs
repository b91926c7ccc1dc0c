//! Auth Error - Classified error surfaced by the auth bridge
//!
//! Defines [`AuthError`] struct and [`AuthResult<T>`] type alias.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// 認証ブリッジ統一エラー型
///
/// ブリッジの境界で生成され、呼び出し側に表示された後に破棄されます。
/// プロバイダ固有のエラーオブジェクトはこの型に含めません（コード文字列のみ保持）。
///
/// ## Fields
/// * `kind` - エラーの分類（閉じた分類体系）
/// * `message` - ユーザー向けのエラーメッセージ
/// * `action` - ユーザーが取るべきアクション（オプション）
/// * `provider_code` - 元のプロバイダコード（診断用、オプション）
/// * `session` - サーバーセッション確立失敗の詳細（オプション）
///
/// ## Examples
/// ```rust
/// use kernel::error::{auth_error::AuthError, kind::ErrorKind};
///
/// let err = AuthError::new(ErrorKind::AccountConflict, "This email is registered with Google.")
///     .with_action("Sign in with Google instead");
/// assert_eq!(err.kind(), ErrorKind::AccountConflict);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AuthError {
    /// エラー種別
    kind: ErrorKind,
    /// ユーザー向けメッセージ
    message: Cow<'static, str>,
    /// ユーザーが取るべきアクション
    action: Option<Cow<'static, str>>,
    /// 元のプロバイダコード
    provider_code: Option<String>,
    /// サーバーセッション確立失敗の詳細
    session: Option<SessionFailure>,
}

/// サーバーセッション確立失敗の詳細
///
/// `status` is `None` when the request never produced an HTTP response
/// (network failure, token mint failure).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub status: Option<u16>,
    pub body: String,
}

/// 認証結果型エイリアス
///
/// ## Examples
/// ```rust
/// use kernel::error::auth_error::{AuthError, AuthResult};
///
/// fn check(email: &str) -> AuthResult<()> {
///     if !email.contains('@') {
///         return Err(AuthError::invalid_input("Please enter a valid email address."));
///     }
///     Ok(())
/// }
/// assert!(check("nobody").is_err());
/// ```
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// 新しいエラーを作成
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            action: None,
            provider_code: None,
            session: None,
        }
    }

    /// 既定メッセージでエラーを作成
    #[inline]
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }

    // ========================================================================
    // Convenience constructors
    // ========================================================================

    #[inline]
    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    #[inline]
    pub fn account_conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::AccountConflict, message)
    }

    #[inline]
    pub fn sign_out_failed() -> Self {
        Self::from_kind(ErrorKind::SignOutFailed)
    }

    /// サーバーセッション確立失敗
    ///
    /// ## Arguments
    /// * `status` - HTTP ステータス（レスポンスが無い場合は `None`）
    /// * `body` - レスポンス本文（そのまま保持）
    pub fn session_establish_failed(status: Option<u16>, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = match status {
            Some(status) => format!("Server session request failed with status {status}"),
            None => "Server session request could not be completed".to_string(),
        };
        Self::new(ErrorKind::SessionEstablishFailed, message)
            .with_session_failure(SessionFailure { status, body })
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// ユーザー向けアクションを設定
    #[inline]
    pub fn with_action(mut self, action: impl Into<Cow<'static, str>>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// 元のプロバイダコードを設定（診断用）
    #[inline]
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// セッション失敗の詳細を設定
    #[inline]
    pub fn with_session_failure(mut self, failure: SessionFailure) -> Self {
        self.session = Some(failure);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    #[inline]
    pub fn provider_code(&self) -> Option<&str> {
        self.provider_code.as_deref()
    }

    #[inline]
    pub fn session_failure(&self) -> Option<&SessionFailure> {
        self.session.as_ref()
    }

    /// 再試行可能かどうか
    #[inline]
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// UI 向けの JSON 表現
    ///
    /// Only presentable fields are included; the provider code and the
    /// backend body stay on the Rust side for diagnostics.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": self.kind,
            "message": self.message(),
            "action": self.action(),
            "retryable": self.is_retryable(),
        })
    }
}

impl fmt::Debug for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("AuthError");
        builder.field("kind", &self.kind);
        builder.field("message", &self.message);
        if let Some(action) = &self.action {
            builder.field("action", action);
        }
        if let Some(code) = &self.provider_code {
            builder.field("provider_code", code);
        }
        if let Some(session) = &self.session {
            builder.field("session", session);
        }
        builder.finish()
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(action) = &self.action {
            write!(f, " (Action: {})", action)?;
        }
        Ok(())
    }
}

impl Error for AuthError {}

impl From<ErrorKind> for AuthError {
    fn from(kind: ErrorKind) -> Self {
        AuthError::from_kind(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_error() {
        let err = AuthError::new(ErrorKind::NotFound, "No account");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "No account");
        assert!(err.action().is_none());
        assert!(err.provider_code().is_none());
        assert!(err.session_failure().is_none());
    }

    #[test]
    fn test_from_kind_uses_default_message() {
        let err: AuthError = ErrorKind::Blocked.into();
        assert_eq!(err.message(), ErrorKind::Blocked.default_message());
    }

    #[test]
    fn test_session_establish_failed_keeps_status_and_body() {
        let err = AuthError::session_establish_failed(Some(401), "token expired");
        assert_eq!(err.kind(), ErrorKind::SessionEstablishFailed);
        let failure = err.session_failure().unwrap();
        assert_eq!(failure.status, Some(401));
        assert_eq!(failure.body, "token expired");
        assert!(err.message().contains("401"));

        let err = AuthError::session_establish_failed(None, "connection refused");
        assert_eq!(err.session_failure().unwrap().status, None);
    }

    #[test]
    fn test_display() {
        let err = AuthError::not_found("No account found");
        assert_eq!(err.to_string(), "[notFound] No account found");

        let err = AuthError::account_conflict("Registered with Google")
            .with_action("Sign in with Google");
        assert!(err.to_string().contains("Action:"));
    }

    #[test]
    fn test_to_json_hides_diagnostics() {
        let err = AuthError::session_establish_failed(Some(500), "stack trace here")
            .with_provider_code("internal-error");
        let json = err.to_json();
        assert_eq!(json["kind"], "sessionEstablishFailed");
        assert_eq!(json["retryable"], true);
        assert!(!json.to_string().contains("stack trace"));
        assert!(!json.to_string().contains("internal-error"));
    }
}
