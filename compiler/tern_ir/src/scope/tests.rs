#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::Value;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn n(s: &str) -> Name {
    Name::intern(s)
}

/// A block statement with an initialized scope, child of `parent`.
fn scope_in(ast: &mut Ast, parent: Option<ScopeId>) -> ScopeId {
    let blk = ast.block(vec![]);
    let scope = ast.scope_of(blk.into()).unwrap();
    ast.init_static_block(scope, parent).unwrap();
    scope
}

#[test]
fn test_init_twice_fails() {
    let mut ast = Ast::new();
    let s = scope_in(&mut ast, None);
    assert_eq!(
        ast.init_static_block(s, None),
        Err(ScopeError::AlreadyInitialized { scope: s })
    );
}

#[test]
fn test_uninitialized_parent_is_rejected() {
    let mut ast = Ast::new();
    let parent = ast.block(vec![]);
    let parent = ast.scope_of(parent.into()).unwrap();
    let child = ast.block(vec![]);
    let child = ast.scope_of(child.into()).unwrap();
    assert_eq!(
        ast.init_static_block(child, Some(parent)),
        Err(ScopeError::Uninitialized { scope: parent })
    );
    assert_eq!(
        ast.define(parent, n("x"), TypedValue::of_type(Type::INT)),
        Err(ScopeError::Uninitialized { scope: parent })
    );
}

#[test]
fn test_define_progresses_through_states() {
    let mut ast = Ast::new();
    let s = scope_in(&mut ast, None);
    let x = n("x");

    assert_eq!(ast.define(s, x, TypedValue::untyped_slot()), Ok(0));
    assert_eq!(ast.static_type_of(s, x), Ok(None));
    assert_eq!(ast.define(s, x, TypedValue::of_type(Type::INT)), Ok(0));
    assert_eq!(ast.static_type_of(s, x), Ok(Some(Type::INT)));
    assert_eq!(ast.define(s, x, TypedValue::int(3)), Ok(0));
    assert_eq!(ast.num_names(s), 1);
    assert_eq!(ast.names(s), &[x]);

    let slot = ast.value_ref(s, x).unwrap();
    assert!(matches!(slot.get().v, Value::Int(3)));
}

#[test]
fn test_redefinition_errors() {
    let mut ast = Ast::new();
    let s = scope_in(&mut ast, None);
    let x = n("x");
    ast.define(s, x, TypedValue::untyped_slot()).unwrap();

    assert_eq!(
        ast.define(s, x, TypedValue::untyped_slot()),
        Err(ScopeError::RedefinitionWithoutType { name: x })
    );

    ast.define(s, x, TypedValue::of_type(Type::INT)).unwrap();
    assert_eq!(
        ast.define(s, x, TypedValue::of_type(Type::INT)),
        Err(ScopeError::AlreadyDefined { name: x })
    );
    assert_eq!(
        ast.define(s, x, TypedValue::string("no")),
        Err(ScopeError::TypeChanged {
            name: x,
            old: "int".into(),
            new: "string".into(),
        })
    );

    ast.define(s, x, TypedValue::int(1)).unwrap();
    assert_eq!(
        ast.define(s, x, TypedValue::int(2)),
        Err(ScopeError::ValueChanged { name: x })
    );
    assert_eq!(
        ast.define(s, x, TypedValue::int(1)),
        Err(ScopeError::AlreadyDefined { name: x })
    );
}

#[test]
fn test_define_rejects_bad_input() {
    let mut ast = Ast::new();
    let s = scope_in(&mut ast, None);
    assert_eq!(
        ast.define(s, Name::EMPTY, TypedValue::int(1)),
        Err(ScopeError::EmptyName)
    );
    let bare = TypedValue {
        t: None,
        v: Value::Int(1),
    };
    assert_eq!(
        ast.define(s, n("y"), bare),
        Err(ScopeError::ValueWithoutType { name: n("y") })
    );
    assert_eq!(ast.num_names(s), 0);
}

#[test]
fn test_path_generations_start_at_one() {
    let mut ast = Ast::new();
    let outer = scope_in(&mut ast, None);
    let inner = scope_in(&mut ast, Some(outer));
    ast.define(outer, n("a"), TypedValue::of_type(Type::INT)).unwrap();
    ast.define(outer, n("b"), TypedValue::of_type(Type::INT)).unwrap();
    ast.define(inner, n("c"), TypedValue::of_type(Type::STRING)).unwrap();

    assert_eq!(ast.path_for_name(inner, n("c")), Ok(ValuePath::new(n("c"), 1, 0)));
    assert_eq!(ast.path_for_name(inner, n("b")), Ok(ValuePath::new(n("b"), 2, 1)));
    assert_eq!(ast.path_for_name(outer, n("b")), Ok(ValuePath::new(n("b"), 1, 1)));
    assert_eq!(
        ast.path_for_name(outer, n("c")),
        Err(ScopeError::Undeclared { name: n("c") })
    );
    assert_eq!(
        ast.static_type_of_at(inner, ValuePath::new(n("b"), 2, 1)),
        Ok(Some(Type::INT))
    );
}

#[test]
fn test_inner_names_shadow_outer() {
    let mut ast = Ast::new();
    let outer = scope_in(&mut ast, None);
    let inner = scope_in(&mut ast, Some(outer));
    ast.define(outer, n("v"), TypedValue::int(1)).unwrap();
    ast.define(inner, n("v"), TypedValue::string("s")).unwrap();
    assert_eq!(ast.path_for_name(inner, n("v")).unwrap().depth, 1);
    assert_eq!(ast.static_type_of(inner, n("v")), Ok(Some(Type::STRING)));
    assert_eq!(ast.static_type_of(outer, n("v")), Ok(Some(Type::INT)));
}

#[cfg(debug_assertions)]
#[test]
fn test_blank_has_no_path() {
    let mut ast = Ast::new();
    let s = scope_in(&mut ast, None);
    assert_eq!(ast.path_for_name(s, Name::BLANK), Err(ScopeError::BlankName));
}

#[test]
fn test_chain_deeper_than_a_path_can_address() {
    // Dropping the linked blocks recurses once per level.
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(|| {
            let mut ast = Ast::new();
            let outer = scope_in(&mut ast, None);
            ast.define(outer, n("far"), TypedValue::of_type(Type::INT)).unwrap();
            let mut inner = outer;
            for _ in 0..u16::MAX {
                inner = scope_in(&mut ast, Some(inner));
            }
            ast.define(inner, n("near"), TypedValue::of_type(Type::INT)).unwrap();

            assert_eq!(ast.path_for_name(inner, n("near")).unwrap().depth, 1);
            assert_eq!(
                ast.path_for_name(inner, n("far")),
                Err(ScopeError::ChainTooDeep { name: n("far") })
            );
            assert_eq!(
                ast.path_for_name(inner, n("nowhere")),
                Err(ScopeError::ChainTooDeep { name: n("nowhere") })
            );
        })
        .unwrap();
    handle.join().unwrap();
}

#[test]
fn test_instantiate_zeroes_variables_and_keeps_constants() {
    let mut ast = Ast::new();
    let outer = scope_in(&mut ast, None);
    let s = scope_in(&mut ast, Some(outer));
    ast.define(s, n("count"), TypedValue::of_type(Type::INT)).unwrap();
    ast.define(s, n("limit"), TypedValue::int(10)).unwrap();
    ast.define(s, n("later"), TypedValue::untyped_slot()).unwrap();

    let parent = ast.instantiate(outer, None).unwrap();
    let block = ast.instantiate(s, Some(parent.clone())).unwrap();
    let b = block.borrow();
    assert_eq!(b.len(), 3);
    assert!(matches!(b.get(0).unwrap().v, Value::Int(0)));
    assert!(matches!(b.get(1).unwrap().v, Value::Int(10)));
    assert!(b.get(2).unwrap().is_undefined());
    assert!(b.parent().unwrap().ptr_eq(&parent));

    // The static block keeps its own slot.
    drop(b);
    block.borrow_mut().get_mut(0).unwrap().v = Value::Int(5);
    assert!(matches!(
        ast.value_ref(s, n("count")).unwrap().get().v,
        Value::None
    ));
}

proptest! {
    /// Every defined name resolves to a path whose slot is the one defining it.
    #[test]
    fn paths_address_the_defining_slot(
        sizes in proptest::collection::vec(1usize..6, 1..5),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut ast = Ast::new();
        let mut parent = None;
        let mut all = Vec::new();
        for (depth, &size) in sizes.iter().enumerate() {
            let s = scope_in(&mut ast, parent);
            for i in 0..size {
                let name = n(&format!("v{depth}_{i}"));
                ast.define(s, name, TypedValue::int(i64::try_from(i).unwrap())).unwrap();
                all.push((name, i));
            }
            parent = Some(s);
        }
        let innermost = parent.unwrap();
        let (name, i) = *pick.get(&all);
        let path = ast.path_for_name(innermost, name).unwrap();
        prop_assert!(path.depth >= 1);
        let by_path = ast.value_ref_at(innermost, path).unwrap();
        let by_name = ast.value_ref(innermost, name).unwrap();
        prop_assert!(by_path.same_slot(&by_name));
        prop_assert!(matches!(by_path.get().v, Value::Int(v) if v == i64::try_from(i).unwrap()));
    }
}
