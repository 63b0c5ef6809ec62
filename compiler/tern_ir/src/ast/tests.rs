#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::{BinaryOp, Type, TypedValue, ValuePath};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

fn path(name: &str, depth: u16, index: u16) -> ValuePath {
    ValuePath::new(Name::intern(name), depth, index)
}

#[test]
fn test_ids_are_sequential_per_arena() {
    let mut ast = Ast::new();
    let a = ast.int_lit("1");
    let b = ast.int_lit("2");
    let s = ast.expr_stmt(a);
    assert_eq!(a.index(), 0);
    assert_eq!(b.index(), 1);
    assert_eq!(s.index(), 0);
    assert_eq!(ast.expr_count(), 2);
    assert_eq!(ast.stmt_count(), 1);
}

#[test]
fn test_scoped_nodes_own_their_scope() {
    let mut ast = Ast::new();
    let ty = ast.func_type(vec![], vec![]);
    let lit = ast.func_lit(ty, vec![]);
    let blk = ast.block(vec![]);

    let lit_scope = ast.scope_of(lit.into()).unwrap();
    let blk_scope = ast.scope_of(blk.into()).unwrap();
    assert_ne!(lit_scope, blk_scope);
    assert_eq!(ast.static_block(lit_scope).source(), NodeId::Expr(lit));
    assert_eq!(ast.static_block(blk_scope).source(), NodeId::Stmt(blk));
    assert!(!ast.static_block(lit_scope).is_initialized());
    assert_eq!(ast.scope_of(ty.into()), None);
}

#[test]
fn test_attributes_report_previous_value() {
    let mut ast = Ast::new();
    let x = ast.int_lit("7");
    assert!(ast.attr(x, AttrKey::Preprocessed).is_none());
    assert!(ast
        .set_attr(x, AttrKey::Preprocessed, AttrValue::Flag(true))
        .is_none());
    let old = ast
        .set_attr(x, AttrKey::Preprocessed, AttrValue::Flag(false))
        .unwrap();
    assert!(old.same_as(&AttrValue::Flag(true)));
    assert!(ast
        .attr(x, AttrKey::Preprocessed)
        .unwrap()
        .same_as(&AttrValue::Flag(false)));

    let label = AttrKey::Custom(Name::intern("loop"));
    ast.set_attr(x, label, AttrValue::Int(3));
    assert!(ast.attr(x, label).unwrap().same_as(&AttrValue::Int(3)));
    assert!(ast.attr(x, AttrKey::Iota).is_none());
}

#[test]
fn test_decl_lookup_skips_imports() {
    let mut ast = Ast::new();
    let imp = ast.import_decl("fmt", "std/fmt");
    let one = ast.int_lit("1");
    let var = ast.var_decl("count", path("count", 1, 0), None, Some(one));
    let other = ast.import_decl("count", "std/count");
    let f1 = ast.alloc_file(Name::intern("a.tern"), Name::intern("main"), vec![imp]);
    let f2 = ast.alloc_file(Name::intern("b.tern"), Name::intern("main"), vec![other, var]);
    let pkg = ast.alloc_package("tern.land/r/demo", Name::intern("main"), vec![f1, f2]);

    assert_eq!(ast.file_by_name(pkg, Name::intern("b.tern")), Some(f2));
    assert_eq!(ast.file_by_name(pkg, Name::intern("c.tern")), None);
    assert_eq!(ast.decl_for(pkg, Name::intern("count")), Ok((f2, var)));
    assert_eq!(
        ast.decl_for(pkg, Name::intern("fmt")),
        Err(ScopeError::DeclNotFound {
            name: Name::intern("fmt")
        })
    );
}

#[test]
fn test_literal_accessors() {
    let mut ast = Ast::new();
    let s = ast.string_lit("\"a\\tb\"");
    let n = ast.int_lit("0x1f");
    assert_eq!(ast.lit_string(s).unwrap(), b"a\tb");
    assert_eq!(ast.lit_int(n).unwrap(), BigInt::from(31));
    assert!(ast.lit_int(s).is_err());
    assert!(ast.lit_string(n).is_err());
}

#[test]
fn test_copy_gives_fresh_nodes_and_scopes() {
    let mut ast = Ast::new();
    let one = ast.int_lit("1");
    let ret = ast.return_stmt(vec![one]);
    let int_ty = ast.const_type(Type::INT);
    let result = ast.field_type("", int_ty);
    let ty = ast.func_type(vec![], vec![result]);
    let lit = ast.func_lit(ty, vec![ret]);
    let scope = ast.scope_of(lit.into()).unwrap();
    ast.init_static_block(scope, None).unwrap();
    ast.set_attr(lit, AttrKey::Preprocessed, AttrValue::Flag(true));

    let copy = ast.copy_expr(lit);
    assert_ne!(copy, lit);
    let copy_scope = ast.scope_of(copy.into()).unwrap();
    assert_ne!(copy_scope, scope);
    assert!(!ast.static_block(copy_scope).is_initialized());
    assert!(ast.attr(copy, AttrKey::Preprocessed).is_none());

    let ExprKind::FuncLit { body, .. } = ast.expr(copy) else {
        panic!("copy is not a function literal");
    };
    assert_ne!(body[0], ret);
    assert_eq!(ast.display(copy).to_string(), ast.display(lit).to_string());
}

#[test]
fn test_display_renders_source_form() {
    let mut ast = Ast::new();
    let x = ast.name("x", path("x", 1, 0));
    let one = ast.int_lit("1");
    let sum = ast.binary(BinaryOp::Add, x, one);
    let assign = ast.assign(vec![x], vec![sum]);
    let cond = ast.binary(BinaryOp::Lt, x, one);
    let ret = ast.return_stmt(vec![x]);
    let stmt = ast.if_stmt(None, cond, vec![assign], vec![ret]);
    assert_eq!(
        ast.display(stmt).to_string(),
        "if (x < 1) { x = (x + 1) } else { return x }"
    );

    let c = ast.constant(TypedValue::int(5));
    assert_eq!(ast.display(c).to_string(), "5");
}

#[test]
fn test_deep_trees_copy_and_display() {
    let mut ast = Ast::new();
    let mut e = ast.int_lit("1");
    for _ in 0..20_000 {
        let one = ast.int_lit("1");
        e = ast.binary(BinaryOp::Add, e, one);
    }
    let copy = ast.copy_expr(e);
    let shown = ast.display(copy).to_string();
    assert!(shown.starts_with("(((("));
    assert_eq!(shown.matches('+').count(), 20_000);
}
