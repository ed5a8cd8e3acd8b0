//! Scripts injected into live pages.
//!
//! One helper installs everything the watcher needs page-side: an element
//! tagger, a MutationObserver that queues inserted elements, and the
//! highlight applier. The Rust side only ever evaluates small call
//! expressions against the installed `window.__quizmark` object.

use crate::detect::{ElementId, ID_ATTR};
use crate::highlight::{HIGHLIGHT_CLASS, HIGHLIGHT_CSS, STYLE_BLOCK_ID};
use serde::{Deserialize, Serialize};

/// Page-side install function. Idempotent: a second install call leaves
/// the existing observer and counters in place.
pub const HELPER_JS: &str = r#"
window.__quizmarkInstall = window.__quizmarkInstall || function (opts) {
  if (window.__quizmark) { return true; }
  var state = { next: 0, queue: [] };
  function stampOne(el) {
    if (!el.hasAttribute(opts.attr)) {
      state.next += 1;
      el.setAttribute(opts.attr, String(state.next));
    }
  }
  function stamp(el) {
    stampOne(el);
    var all = el.querySelectorAll('*');
    for (var i = 0; i < all.length; i++) { stampOne(all[i]); }
  }
  function ensureStyles() {
    if (document.getElementById(opts.styleId)) { return; }
    var style = document.createElement('style');
    style.id = opts.styleId;
    style.textContent = opts.css;
    document.head.appendChild(style);
  }
  window.__quizmark = {
    snapshot: function () {
      if (document.body) { stamp(document.body); }
      return document.documentElement.outerHTML;
    },
    drain: function () {
      var out = state.queue;
      state.queue = [];
      return out;
    },
    apply: function (ids) {
      ensureStyles();
      var applied = 0;
      for (var i = 0; i < ids.length; i++) {
        var el = document.querySelector('[' + opts.attr + '="' + ids[i] + '"]');
        if (el && !el.classList.contains(opts.className)) {
          el.classList.add(opts.className);
          applied += 1;
        }
      }
      return applied;
    }
  };
  var observer = new MutationObserver(function (mutations) {
    for (var i = 0; i < mutations.length; i++) {
      var added = mutations[i].addedNodes;
      for (var j = 0; j < added.length; j++) {
        var node = added[j];
        if (node.nodeType !== 1) { continue; }
        stamp(node);
        state.queue.push({
          id: Number(node.getAttribute(opts.attr)),
          html: node.outerHTML
        });
      }
    }
  });
  observer.observe(document.body, { childList: true, subtree: true });
  return true;
};
"#;

/// Fixed names and styles handed to the page helper on install.
#[derive(Debug, Serialize)]
struct InstallOptions {
    attr: &'static str,
    #[serde(rename = "styleId")]
    style_id: &'static str,
    #[serde(rename = "className")]
    class_name: &'static str,
    css: &'static str,
}

/// An element queued by the page-side observer.
#[derive(Debug, Clone, Deserialize)]
pub struct InsertedRecord {
    pub id: u64,
    pub html: String,
}

/// Call expression installing the helper with the crate's fixed names.
pub fn install_call() -> String {
    let opts = InstallOptions {
        attr: ID_ATTR,
        style_id: STYLE_BLOCK_ID,
        class_name: HIGHLIGHT_CLASS,
        css: HIGHLIGHT_CSS,
    };
    let json = serde_json::to_string(&opts).unwrap_or_else(|_| "{}".to_string());
    format!("window.__quizmarkInstall({json})")
}

/// Call expression: tag the document and return its outer HTML.
pub const SNAPSHOT_CALL: &str = "window.__quizmark.snapshot()";

/// Call expression: drain queued insertions.
pub const DRAIN_CALL: &str = "window.__quizmark.drain()";

/// Call expression applying highlights to the given elements.
pub fn apply_call(elements: &[ElementId]) -> String {
    let ids = serde_json::to_string(elements).unwrap_or_else(|_| "[]".to_string());
    format!("window.__quizmark.apply({ids})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_call_carries_fixed_names() {
        let call = install_call();
        assert!(call.starts_with("window.__quizmarkInstall({"));
        assert!(call.contains("data-quizmark-id"));
        assert!(call.contains("answer-highlighter-dynamic-styles"));
        assert!(call.contains("correct-answer-highlight"));
        assert!(call.contains("#28a745"));
    }

    #[test]
    fn test_apply_call_serializes_ids() {
        let call = apply_call(&[ElementId(3), ElementId(11)]);
        assert_eq!(call, "window.__quizmark.apply([3,11])");
    }

    #[test]
    fn test_inserted_record_deserializes() {
        let records: Vec<InsertedRecord> =
            serde_json::from_value(serde_json::json!([{"id": 4, "html": "<li>A. x</li>"}]))
                .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 4);
    }
}
