/// Document readiness plus resource fetches that have not finished yet.
pub const CHECK_LOADING: &str = r#"
() => ({
    readyState: document.readyState,
    activeRequests: performance.getEntriesByType('resource')
        .filter(entry => entry.responseEnd === 0).length
})
"#;
