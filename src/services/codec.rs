//! Query-string codec for request parameters.
//!
//! The page's request layer hands over its parameters already assembled as an
//! `application/x-www-form-urlencoded` blob. [`decode`] turns that blob into the
//! argument mapping for the command invoker; [`encode`] does the reverse for
//! requests the flow re-issues itself.

use crate::models::InvocationArgs;
use url::form_urlencoded;

/// Decode a form-urlencoded blob into invocation arguments.
///
/// Pairs are split on `&`, keys and values on the first `=`, and both are
/// percent-decoded (`+` becomes a space). A repeated key keeps its last value.
pub fn decode(blob: &str) -> InvocationArgs {
    let mut args = InvocationArgs::new();
    for (key, value) in form_urlencoded::parse(blob.as_bytes()) {
        args.insert(key.into_owned(), value.into_owned());
    }
    args
}

/// Encode invocation arguments as a form-urlencoded blob.
pub fn encode(args: &InvocationArgs) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(args.iter())
        .finish()
}
