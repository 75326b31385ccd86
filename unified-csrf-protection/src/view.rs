//! Template helpers exposing the current token to rendered pages.

use crate::context::CsrfContext;
use crate::masking::mask_token;
use unified_csrf_core::HttpRequest;

/// Form field carrying a submitted token
pub const AUTHENTICITY_PARAM: &str = "authenticity_token";

/// Current token of a request, once [`ForgeryProtection`](crate::ForgeryProtection) resolved it
pub fn csrf_token(request: &HttpRequest) -> Option<&str> {
    CsrfContext::of(request).and_then(CsrfContext::current_token)
}

/// Freshly masked current token, for embedding in a page
pub fn masked_authenticity_token(request: &HttpRequest) -> Option<String> {
    csrf_token(request).map(mask_token)
}

pub fn hidden_field(token: &str) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}" />"#,
        AUTHENTICITY_PARAM,
        mask_token(token)
    )
}

pub fn meta_tags(token: &str) -> String {
    format!(
        "<meta name=\"csrf-param\" content=\"{}\" />\n<meta name=\"csrf-token\" content=\"{}\" />",
        AUTHENTICITY_PARAM,
        mask_token(token)
    )
}
