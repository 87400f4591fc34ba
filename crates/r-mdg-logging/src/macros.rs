//! ---
//! ems_section: "03-persistence-logging"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Structured logging context for fixture generation."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Context-enriched logging macros.

/// Emit an informational log enriched with fixture context.
#[macro_export]
macro_rules! mdg_info {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::INFO,
            table = ctx.table.unwrap_or(""),
            file = ctx.file.unwrap_or(""),
            rows = ctx.rows.unwrap_or_default(),
            district = ctx.district.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        $crate::mdg_info!(context = $crate::LogContext::default(), $($arg)+)
    }};
}

/// Emit a debug log enriched with fixture context.
#[macro_export]
macro_rules! mdg_debug {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::DEBUG,
            table = ctx.table.unwrap_or(""),
            file = ctx.file.unwrap_or(""),
            rows = ctx.rows.unwrap_or_default(),
            district = ctx.district.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        $crate::mdg_debug!(context = $crate::LogContext::default(), $($arg)+)
    }};
}

/// Emit a warning enriched with fixture context.
#[macro_export]
macro_rules! mdg_warn {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::WARN,
            table = ctx.table.unwrap_or(""),
            file = ctx.file.unwrap_or(""),
            rows = ctx.rows.unwrap_or_default(),
            district = ctx.district.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        $crate::mdg_warn!(context = $crate::LogContext::default(), $($arg)+)
    }};
}
