pub const CHECK_ELEMENT_STATE: &str = r#"
(selector) => {
    const el = document.querySelector(selector);
    if (!el) return { exists: false };

    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    const isVisible = rect.width > 0 && rect.height > 0 &&
                     style.visibility !== 'hidden' && style.display !== 'none';

    if (!isVisible) return { exists: true, visible: false };

    return {
        exists: true,
        visible: isVisible,
        disabled: el.disabled || el.getAttribute('aria-disabled') === 'true',
    };
}
"#;

// Element-bound functions, run through `Element::call_js_fn` with `this` bound.

// A re-rendered node keeps its object id but leaves the document; acting on it
// would silently do nothing, so both throw instead.

pub const SCROLL_INTO_VIEW: &str = r#"function() {
    if (!this.isConnected) throw new Error('Node is detached');
    this.scrollIntoView(true);
    return true;
}"#;

pub const CLICK: &str = r#"function() {
    if (!this.isConnected) throw new Error('Node is detached');
    this.click();
    return true;
}"#;

/// Resolved `href`, absolute even when the markup is relative.
pub const READ_HREF: &str = "function() { return typeof this.href === 'string' ? this.href : null; }";
