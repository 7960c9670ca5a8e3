use datum_types::{Document, KeyPath, Value};

use crate::error::{DocError, DocResult};

/// Walk `ancestors` from `doc`, creating empty documents where a component is
/// missing. Fails with [`DocError::NotAMap`] on a component holding any other
/// kind of value.
pub fn find_or_create_sub<'a>(
    doc: &'a mut Document,
    ancestors: &[String],
) -> DocResult<&'a mut Document> {
    let mut pos = doc;
    for component in ancestors {
        let child = pos
            .entry(component.clone())
            .or_insert_with(|| Value::Document(Document::new()));
        match child {
            Value::Document(sub) => pos = sub,
            _ => return Err(DocError::NotAMap(component.clone())),
        }
    }
    Ok(pos)
}

/// Write `value` at `path`, or delete the leaf when `value` is `None`.
///
/// Writes overwrite whatever the leaf held, including a whole sub-document.
/// Deletes never create ancestors; a delete below a missing ancestor is a
/// no-op. Returns the value previously at the leaf.
pub fn set_path(
    doc: &mut Document,
    path: &KeyPath,
    value: Option<Value>,
) -> DocResult<Option<Value>> {
    match value {
        Some(value) => {
            let (ancestors, leaf) = path.split_leaf().ok_or(DocError::RootWrite)?;
            let pos = find_or_create_sub(doc, ancestors)?;
            Ok(pos.insert(leaf, value))
        }
        None => remove_path(doc, path),
    }
}

/// Delete the leaf at `path`, then remove each document on the path that the
/// delete emptied, innermost first.
pub fn remove_path(doc: &mut Document, path: &KeyPath) -> DocResult<Option<Value>> {
    if path.is_root() {
        return Err(DocError::RootWrite);
    }
    remove_components(doc, path.components())
}

fn remove_components(doc: &mut Document, components: &[String]) -> DocResult<Option<Value>> {
    match components {
        [] => Ok(None),
        [leaf] => Ok(doc.remove(leaf)),
        [head, rest @ ..] => {
            let (removed, emptied) = match doc.get_mut(head) {
                None => return Ok(None),
                Some(Value::Document(sub)) => {
                    let removed = remove_components(sub, rest)?;
                    (removed, sub.is_empty())
                }
                Some(_) => return Err(DocError::NotAMap(head.clone())),
            };
            if emptied {
                doc.remove(head);
            }
            Ok(removed)
        }
    }
}

/// Read the value at `path`. The root path returns the whole document.
///
/// Returns `None` when any ancestor is missing or is not a document.
pub fn get_path(doc: &Document, path: &KeyPath) -> Option<Value> {
    let Some((ancestors, leaf)) = path.split_leaf() else {
        return Some(Value::Document(doc.clone()));
    };
    let mut pos = doc;
    for component in ancestors {
        pos = pos.get(component)?.as_document()?;
    }
    pos.get(leaf).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use datum_types::EncryptedValue;

    fn path(s: &str) -> KeyPath {
        KeyPath::parse(s)
    }

    #[test]
    fn stores_new_keys() {
        let mut doc = Document::new();
        set_path(&mut doc, &path("blah"), Some("foo".into())).unwrap();
        assert_eq!(doc, Document::new().with("blah", "foo"));
    }

    #[test]
    fn stores_keys_in_existing_document() {
        let mut doc = Document::new().with("name", "vektra");
        set_path(&mut doc, &path("blah"), Some("foo".into())).unwrap();
        assert_eq!(doc, Document::new().with("name", "vektra").with("blah", "foo"));
    }

    #[test]
    fn write_then_read() {
        let mut doc = Document::new();
        set_path(&mut doc, &path("a.b"), Some("x".into())).unwrap();
        assert_eq!(get_path(&doc, &path("a.b")), Some(Value::from("x")));
    }

    #[test]
    fn auto_creates_ancestors() {
        let mut doc = Document::new();
        set_path(&mut doc, &path("a.b.c"), Some(1.into())).unwrap();
        let expected = Document::new().with(
            "a",
            Document::new().with("b", Document::new().with("c", 1)),
        );
        assert_eq!(doc, expected);
    }

    #[test]
    fn delete_prunes_emptied_ancestors() {
        let mut doc = Document::new().with("a", Document::new().with("b", "x"));
        let removed = set_path(&mut doc, &path("a.b"), None).unwrap();
        assert_eq!(removed, Some(Value::from("x")));
        assert!(doc.is_empty());
    }

    #[test]
    fn delete_prunes_deep_chains_only_as_far_as_empty() {
        let mut doc = Document::new().with(
            "a",
            Document::new()
                .with("keep", 1)
                .with("b", Document::new().with("c", Document::new().with("d", true))),
        );
        set_path(&mut doc, &path("a.b.c.d"), None).unwrap();
        assert_eq!(doc, Document::new().with("a", Document::new().with("keep", 1)));
    }

    #[test]
    fn delete_keeps_siblings() {
        let mut doc = Document::new().with(
            "blah",
            Document::new().with("bar", "foo").with("qux", "kek"),
        );
        set_path(&mut doc, &path("blah.bar"), None).unwrap();
        assert_eq!(
            doc,
            Document::new().with("blah", Document::new().with("qux", "kek"))
        );
    }

    #[test]
    fn delete_under_missing_ancestor_is_noop() {
        let mut doc = Document::new().with("other", 1);
        let removed = set_path(&mut doc, &path("x.y.z"), None).unwrap();
        assert!(removed.is_none());
        assert_eq!(doc, Document::new().with("other", 1));
    }

    #[test]
    fn delete_through_scalar_is_not_a_map() {
        let mut doc = Document::new().with("a", "scalar");
        assert_eq!(
            set_path(&mut doc, &path("a.b"), None),
            Err(DocError::NotAMap("a".into()))
        );
    }

    #[test]
    fn write_through_scalar_is_not_a_map() {
        let mut doc = Document::new().with("a", "scalar");
        assert_eq!(
            set_path(&mut doc, &path("a.b"), Some(1.into())),
            Err(DocError::NotAMap("a".into()))
        );
        assert_eq!(doc, Document::new().with("a", "scalar"));
    }

    #[test]
    fn write_through_encrypted_is_not_a_map() {
        let mut doc = Document::new().with("s", EncryptedValue::new("k", b"c".to_vec()));
        assert!(matches!(
            set_path(&mut doc, &path("s.inner"), Some(true.into())),
            Err(DocError::NotAMap(_))
        ));
    }

    #[test]
    fn overwrites_sub_documents() {
        let mut doc = Document::new().with("a", Document::new().with("b", 1).with("c", 2));
        set_path(&mut doc, &path("a"), Some("flat".into())).unwrap();
        assert_eq!(doc, Document::new().with("a", "flat"));
    }

    #[test]
    fn writes_whole_sub_documents() {
        let mut doc = Document::new();
        let sub = Document::new().with("x", 1).with("y", 2);
        set_path(&mut doc, &path("cfg.db"), Some(sub.clone().into())).unwrap();
        assert_eq!(get_path(&doc, &path("cfg.db")), Some(Value::Document(sub)));
    }

    #[test]
    fn root_write_is_rejected() {
        let mut doc = Document::new();
        assert_eq!(
            set_path(&mut doc, &KeyPath::root(), Some(1.into())),
            Err(DocError::RootWrite)
        );
        assert_eq!(
            set_path(&mut doc, &KeyPath::root(), None),
            Err(DocError::RootWrite)
        );
    }

    #[test]
    fn get_is_permissive() {
        let doc = Document::new().with("a", "scalar");
        assert!(get_path(&doc, &path("a.b")).is_none());
        assert!(get_path(&doc, &path("missing.b")).is_none());
        assert!(get_path(&doc, &path("missing")).is_none());
    }

    #[test]
    fn get_root_returns_document() {
        let doc = Document::new().with("a", 1);
        assert_eq!(
            get_path(&doc, &KeyPath::root()),
            Some(Value::Document(doc.clone()))
        );
    }

    #[test]
    fn get_sub_document() {
        let doc = Document::new().with("a", Document::new().with("b", "x"));
        assert_eq!(
            get_path(&doc, &path("a")),
            Some(Value::Document(Document::new().with("b", "x")))
        );
    }
}
