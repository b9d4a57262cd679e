//! In-page locator resolution
//!
//! Every primitive evaluates one self-contained expression: the shared resolver
//! prelude followed by a short body that acts on the resolved element. Results
//! come back by value as `{ status, ... }` objects.

use serde_json::{json, Value};

use crate::errors::ActionError;
use crate::types::{Locator, Pick, Selector, TextMatch, WaitState};

const RESOLVER: &str = r#"
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
  const textOf = (el) => norm(el.innerText !== undefined ? el.innerText : el.textContent);
  const matchesText = (sel, el) => {
    const value = textOf(el);
    if (!value) return false;
    if (sel.matching === 'regex') {
      try { return new RegExp(sel.text).test(value); } catch (e) { return false; }
    }
    return value.toLowerCase().includes(norm(sel.text).toLowerCase());
  };
  const queryAll = (sel, root) => {
    if (sel.kind === 'css') return Array.from(root.querySelectorAll(sel.value));
    if (sel.kind === 'xpath') {
      const out = [];
      const snap = document.evaluate(sel.value, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
      for (let i = 0; i < snap.snapshotLength; i++) {
        const node = snap.snapshotItem(i);
        if (node && node.nodeType === 1) out.push(node);
      }
      return out;
    }
    const hits = Array.from(root.querySelectorAll('*')).filter((el) => matchesText(sel, el));
    return hits.filter((el) => !hits.some((other) => other !== el && el.contains(other)));
  };
  const pick = (nodes, p) => {
    if (p.kind === 'last') return nodes.length ? nodes[nodes.length - 1] : null;
    if (p.kind === 'nth') return nodes[p.index] || null;
    return nodes.length ? nodes[0] : null;
  };
  const resolveAll = (loc) => {
    let root = document;
    if (loc.parent) {
      root = resolveOne(loc.parent);
      if (!root) return [];
    }
    return queryAll(loc.selector, root);
  };
  const resolveOne = (loc) => pick(resolveAll(loc), loc.pick);
  const isVisible = (el) => {
    if (!el || !el.isConnected) return false;
    const style = window.getComputedStyle(el);
    if (style.visibility === 'hidden' || style.display === 'none') return false;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
  };
"#;

fn selector_json(selector: &Selector) -> Value {
    match selector {
        Selector::Css(value) | Selector::XPath(value) => {
            json!({ "kind": selector.kind(), "value": value })
        }
        Selector::Text { text, matching } => json!({
            "kind": selector.kind(),
            "text": text,
            "matching": match matching {
                TextMatch::Contains => "contains",
                TextMatch::Regex => "regex",
            },
        }),
    }
}

fn locator_json(locator: &Locator) -> Value {
    let pick = match locator.pick {
        Pick::First => json!({ "kind": "first" }),
        Pick::Last => json!({ "kind": "last" }),
        Pick::Nth(index) => json!({ "kind": "nth", "index": index }),
    };
    json!({
        "selector": selector_json(&locator.selector),
        "pick": pick,
        "parent": locator.parent.as_deref().map(locator_json),
    })
}

/// Wraps `body` in an IIFE with `loc` bound to the serialised locator.
pub(crate) fn script(locator: &Locator, body: &str) -> String {
    format!(
        "(() => {{\n  const loc = {};\n{}\n{}\n}})()",
        locator_json(locator),
        RESOLVER,
        body
    )
}

/// Body acting on the single resolved element, `el`.
fn with_element(body: &str) -> String {
    format!(
        "  const el = resolveOne(loc);\n  if (!el) return {{ status: 'not-found' }};\n{body}"
    )
}

pub(crate) fn probe_script(locator: &Locator, state: WaitState) -> String {
    let check = match state {
        WaitState::Attached => "resolveOne(loc) !== null",
        WaitState::Detached => "resolveOne(loc) === null",
        WaitState::Visible => "isVisible(resolveOne(loc))",
        WaitState::Hidden => "!isVisible(resolveOne(loc))",
    };
    script(locator, &format!("  return {{ status: 'ok', value: {check} }};"))
}

pub(crate) fn count_script(locator: &Locator) -> String {
    script(
        locator,
        "  return { status: 'ok', value: resolveAll(loc).length };",
    )
}

pub(crate) fn click_point_script(locator: &Locator) -> String {
    script(
        locator,
        &with_element(
            r#"  el.scrollIntoView({ block: 'center', inline: 'center' });
  const rect = el.getBoundingClientRect();
  if (rect.width === 0 && rect.height === 0) return { status: 'not-visible' };
  return { status: 'ok', x: rect.left + rect.width / 2, y: rect.top + rect.height / 2 };"#,
        ),
    )
}

pub(crate) fn focus_and_clear_script(locator: &Locator) -> String {
    script(
        locator,
        &with_element(
            r#"  el.scrollIntoView({ block: 'center', inline: 'center' });
  el.focus();
  if ('value' in el) {
    el.value = '';
    el.dispatchEvent(new Event('input', { bubbles: true }));
  }
  return { status: 'ok' };"#,
        ),
    )
}

pub(crate) fn commit_input_script(locator: &Locator) -> String {
    script(
        locator,
        &with_element(
            "  el.dispatchEvent(new Event('change', { bubbles: true }));\n  return { status: 'ok' };",
        ),
    )
}

pub(crate) fn text_content_script(locator: &Locator) -> String {
    script(
        locator,
        &with_element("  return { status: 'ok', value: el.textContent };"),
    )
}

pub(crate) fn inner_text_script(locator: &Locator) -> String {
    script(
        locator,
        &with_element(
            "  return { status: 'ok', value: el.innerText !== undefined ? el.innerText : el.textContent };",
        ),
    )
}

pub(crate) fn attribute_script(locator: &Locator, name: &str) -> String {
    script(
        locator,
        &with_element(&format!(
            "  return {{ status: 'ok', value: el.getAttribute({}) }};",
            Value::from(name)
        )),
    )
}

/// Outcome of a resolver script, decoded from its `{ status, ... }` object.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolved {
    Ok(Value),
    NotFound,
    NotVisible,
}

pub(crate) fn decode(locator: &Locator, raw: Value) -> Result<Resolved, ActionError> {
    match raw.get("status").and_then(Value::as_str) {
        Some("ok") => Ok(Resolved::Ok(raw)),
        Some("not-found") => Ok(Resolved::NotFound),
        Some("not-visible") => Ok(Resolved::NotVisible),
        _ => Err(ActionError::Script(format!(
            "resolver for {locator} returned {raw}"
        ))),
    }
}
