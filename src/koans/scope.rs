//! About Scope
//!
//! The suite setup assigns an ambient variable before any case runs.

use anyhow::Result;

use crate::assertion::Expect;
use crate::lang::{Ambient, KoanError, Scope, ValueKind};
use crate::models::{Case, Suite};

pub const SUITE_NAME: &str = "About Scope";

const GLOBAL: &str = "thisIsAGlobalVariable";

pub fn suite() -> Suite {
    Suite::new(
        SUITE_NAME,
        vec![
            Case::new("global variables", global_variables),
            Case::new(
                "variables declared inside of a function",
                declared_inside_function,
            ),
        ],
    )
    .with_setup(assign_global)
}

fn assign_global(ambient: &Ambient) -> Result<()> {
    ambient.set(GLOBAL, 77);
    Ok(())
}

fn global_variables(expect: &mut Expect) -> Result<()> {
    let global = expect.ambient().get(GLOBAL);
    expect.present(&global);
    expect.returns(global, 77);

    let top = Scope::with_ambient(expect.ambient().clone());
    let nested = top.enter(|a| a.enter(|b| b.lookup(GLOBAL)));
    expect.returns(nested, 77);
    Ok(())
}

fn declared_inside_function(expect: &mut Expect) -> Result<()> {
    let outer = Scope::with_ambient(expect.ambient().clone());
    outer.declare("outerVariable", "outer");

    outer.enter(|private| {
        private.declare("innerVariable", "inner");

        expect.returns(private.lookup("outerVariable"), "outer");
        expect.returns(private.lookup("innerVariable"), "inner");
        expect.returns(private.lookup(GLOBAL), 77);
    });

    expect.returns(outer.lookup("outerVariable"), "outer");
    expect.kind_of(outer.lookup("innerVariable").as_ref(), ValueKind::Absent);
    expect.equal(
        outer.resolve("innerVariable"),
        Err(KoanError::Undeclared("innerVariable".to_string())),
    );
    Ok(())
}
