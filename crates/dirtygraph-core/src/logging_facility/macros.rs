//! Boundary logging macros
//!
//! A boundary operation emits exactly one `start` event and then exactly one
//! `end` or `end_error` event. Every arm expands to a block expression, so the
//! macros can stand as a `match` arm value after the operation's result.

/// Log the start of a boundary operation
///
/// # Example
///
/// ```
/// # use dirtygraph_core::log_op_start;
/// log_op_start!("register");
/// log_op_start!("capture_association", entity_type = "Order", association = "items");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = dirtygraph_core_types::schema::EVENT_START,
        );
    }};
    ($op:expr, $($field:tt)*) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = dirtygraph_core_types::schema::EVENT_START,
            $($field)*
        );
    }};
}

/// Log the successful end of a boundary operation
///
/// `duration_ms` is mandatory; any further fields follow it.
///
/// # Example
///
/// ```
/// # use dirtygraph_core::log_op_end;
/// let result: Result<usize, ()> = Ok(2);
/// match &result {
///     Ok(count) => log_op_end!("capture_association", duration_ms = 0, record_count = *count),
///     Err(_) => {}
/// }
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = dirtygraph_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    }};
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = dirtygraph_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    }};
}

/// Log the failed end of a boundary operation
///
/// The error is converted into [`ExError`](crate::errors::ExError) and its
/// kind and stable code land in `err_kind` / `err_code`.
///
/// # Example
///
/// ```
/// # use dirtygraph_core::log_op_error;
/// use dirtygraph_core::errors::TrackError;
///
/// let err = TrackError::TypeNotDeclared { entity_type: "Invoice".to_string() };
/// log_op_error!("register", err, duration_ms = 0, entity_type = "Invoice");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = dirtygraph_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = dirtygraph_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            $($field)*
        );
    }};
}
