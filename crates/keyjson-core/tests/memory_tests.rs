/// Heap growth checks: repeated parsing, serializing and failing must not
/// leave memory behind beyond the key cache's fixed footprint.
///
/// Runs as a single test so no other thread allocates while live bytes are
/// sampled.
use keyjson_core::{
    parse, parse_str, serialize, DecodeErrorKind, Encode, EncodeErrorKind, Key, KeyCache, Shape,
    Value,
};
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicIsize, Ordering};

struct Counting;

static LIVE: AtomicIsize = AtomicIsize::new(0);

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            LIVE.fetch_add(layout.size() as isize, Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        LIVE.fetch_sub(layout.size() as isize, Ordering::Relaxed);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new = unsafe { System.realloc(ptr, layout, new_size) };
        if !new.is_null() {
            LIVE.fetch_add(new_size as isize - layout.size() as isize, Ordering::Relaxed);
        }
        new
    }
}

#[global_allocator]
static ALLOC: Counting = Counting;

const FIXTURE: &str =
    r#"{"a":[81891289, 8919812.190129012], "b": false, "c": null, "d": "東京"}"#;

/// Allowed growth per phase. The global cache's slots are allocated once, up
/// front, so anything past this is a leak.
const MAX_INCREASE: isize = 64 * 1024;

const ITERATIONS: usize = 10_000;

fn live() -> isize {
    LIVE.load(Ordering::Relaxed)
}

fn assert_flat(phase: &str, before: isize) {
    let grown = live() - before;
    assert!(
        grown <= MAX_INCREASE,
        "{phase}: live heap grew by {grown} bytes"
    );
}

fn many_key_document() -> String {
    let entries: Vec<String> = (0..5_000).map(|i| format!(r#""key_{i}":{i}"#)).collect();
    format!("{{{}}}", entries.join(","))
}

/// A host tree whose innermost leaf has no JSON form, so serializing it fails
/// after most of the output has been written.
enum Node {
    Int(i64),
    List(Vec<Node>),
    Dict(Vec<(String, Node)>),
    Opaque,
}

impl Encode for Node {
    fn shape(&self) -> Shape<'_, Self> {
        match self {
            Node::Int(i) => Shape::Int(*i),
            Node::List(items) => Shape::Sequence(Box::new(items.iter())),
            Node::Dict(entries) => {
                Shape::Mapping(Box::new(entries.iter().map(|(k, v)| (Key::Text(k), v))))
            }
            Node::Opaque => Shape::Unknown,
        }
    }
}

fn unsupported_tree() -> Node {
    let mut node = Node::List(vec![Node::Int(1), Node::Int(2), Node::Opaque]);
    for level in 0..8 {
        node = Node::Dict(vec![
            (format!("level_{level}"), Node::Int(level)),
            ("child".to_string(), node),
        ]);
    }
    node
}

#[test]
fn memory_stays_flat() {
    // Warm up: builds the global cache and any lazily allocated runtime state.
    let warm = parse_str(FIXTURE).unwrap();
    assert!(warm.as_object().is_some());
    let _ = KeyCache::global().stats();

    let before = live();
    for _ in 0..ITERATIONS {
        let value = parse_str(FIXTURE).unwrap();
        assert_eq!(value["b"], Value::Bool(false));
    }
    assert_flat("parse", before);

    let fixture = parse_str(FIXTURE).unwrap();
    let before = live();
    for _ in 0..ITERATIONS {
        let bytes = serialize(&fixture).unwrap();
        assert!(!bytes.is_empty());
    }
    assert_flat("serialize", before);

    let broken = br#"{"a":[1,2,{"b":[true,"x"#;
    let before = live();
    for _ in 0..ITERATIONS {
        let err = parse(broken).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::UnterminatedLiteral);
    }
    assert_flat("parse failure", before);

    let nested_then_bad = br#"[{"k":[{"k":[{"k":nope}]}]}]"#;
    let before = live();
    for _ in 0..ITERATIONS {
        assert!(parse(nested_then_bad).is_err());
    }
    assert_flat("parse failure inside containers", before);

    let before = live();
    for _ in 0..ITERATIONS {
        let err = parse(b"").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::EmptyDocument);
    }
    assert_flat("empty document", before);

    let tree = unsupported_tree();
    let before = live();
    for _ in 0..ITERATIONS {
        let err = serialize(&tree).unwrap_err();
        assert_eq!(err.kind, EncodeErrorKind::UnsupportedType);
    }
    assert_flat("serialize failure", before);

    // Many distinct keys churn the cache without growing it.
    let doc = many_key_document();
    parse(doc.as_bytes()).unwrap();
    let before = live();
    for _ in 0..20 {
        let value = parse(doc.as_bytes()).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 5_000);
    }
    assert_flat("distinct keys", before);
}
