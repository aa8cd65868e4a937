//! Fast-path function call.
//!
//! Calls a server function by its oid, bypassing the query parser. The whole
//! exchange is:
//!
//! ```text
//! F FunctionCall  ->
//!                 <- V FunctionCallResponse | E ErrorResponse
//!                 <- Z ReadyForQuery
//! ```
//!
//! <https://www.postgresql.org/docs/current/protocol-flow.html#PROTOCOL-FLOW-FUNCTION-CALL>
use bytes::Bytes;

use crate::{
    Error, Result,
    common::verbose,
    postgres::{
        Oid, PgFormat, ProtocolError,
        backend::{FunctionCallResponse, ReadyForQuery},
        frontend::{FnArg, FunctionCall},
    },
    transport::{PgTransport, PgTransportExt},
};

/// Call server function `function` with binary `args`.
///
/// Returns the binary result, [`None`] when the function returns `NULL`.
///
/// Server error is returned intact after the backend is ready again, the
/// transport is usable for the next request either way.
pub async fn call<IO: PgTransport>(mut io: IO, function: Oid, args: &[FnArg<'_>]) -> Result<Option<Bytes>> {
    verbose!(function, args = args.len(), "fastpath call");

    io.request(FunctionCall { function, args, result_format: PgFormat::Binary }).await?;

    let response = match io.recv::<FunctionCallResponse>().await {
        Ok(ok) => ok,
        Err(err) => {
            verbose!(function, "fastpath error: {err}");
            io.ready_request();
            return Err(err);
        }
    };

    io.recv::<ReadyForQuery>().await?;

    Ok(response.value)
}

/// Unwrap a function result which must not be `NULL`.
pub(crate) fn expect_value(function: &'static str, value: Option<Bytes>) -> Result<Bytes> {
    value.ok_or_else(|| Error::from(ProtocolError::malformed("function returned NULL")).context(function))
}
