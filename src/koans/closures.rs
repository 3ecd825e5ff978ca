//! About Functions And Closure

use anyhow::Result;

use crate::args;
use crate::assertion::Expect;
use crate::lang::{Function, KoanError, Scope, Value, ValueKind};
use crate::models::{Case, Suite};

pub const SUITE_NAME: &str = "About Functions And Closure";

pub fn suite() -> Suite {
    Suite::new(
        SUITE_NAME,
        vec![
            Case::new("defining functions directly", defining_directly),
            Case::new("assigning functions to variables", assigning_to_variables),
            Case::new("self invoking functions", self_invoking),
            Case::new("arguments array", arguments_array),
            Case::new("using call to invoke function", using_call),
            Case::new("using apply to invoke function", using_apply),
            Case::new("call and apply agree", call_and_apply_agree),
        ],
    )
}

fn defining_directly(expect: &mut Expect) -> Result<()> {
    let mut result = "a";
    expect.equal(result, "a");

    let mut change_result = || result = "b";
    change_result();

    expect.equal(result, "b");

    // The same rebinding through an explicit scope chain.
    let outer = Scope::root();
    outer.declare("result", "a");
    let change_result = Function::closure(&outer, &[], |frame, _| {
        frame.assign("result", "b")?;
        Ok(None)
    });
    change_result.call(args![])?;
    expect.returns(outer.lookup("result"), "b");
    Ok(())
}

fn assigning_to_variables(expect: &mut Expect) -> Result<()> {
    let triple = |input: i64| input * 3;

    expect.equal(triple(4), 12);
    Ok(())
}

fn self_invoking(expect: &mut Expect) -> Result<()> {
    let outer = Scope::root();
    outer.declare("publicValue", "shared");
    let public_value = outer.resolve("publicValue")?;

    // Invoked as soon as it is defined; `pv` aliases the public value.
    let seen = Function::closure(&outer, &["pv"], |private, _| {
        private.declare("secretValue", "password");
        Ok(Some(Value::from(vec![
            private.resolve("pv")?,
            private.resolve("secretValue")?,
            private.resolve("publicValue")?,
        ])))
    })
    .call(args![public_value])?;

    expect.returns(seen, vec![
        Value::from("shared"),
        Value::from("password"),
        Value::from("shared"),
    ]);
    expect.kind_of(outer.lookup("secretValue").as_ref(), ValueKind::Absent);
    expect.truthy(!outer.declares("pv"), "the private frame kept its declarations");
    expect.kind_of(outer.lookup("publicValue").as_ref(), ValueKind::Text);
    Ok(())
}

fn arguments_array(expect: &mut Expect) -> Result<()> {
    let add = Function::new(&[], |inv| {
        let mut total = Value::from(0);
        for arg in inv.args().iter() {
            total = total.add(arg)?;
        }
        Ok(Some(total))
    });

    expect.returns(add.call(args![1, 2, 3, 4, 5])?, 15);
    expect.returns(add.call(args![4, 7, -2])?, 9);
    Ok(())
}

fn using_call(expect: &mut Expect) -> Result<()> {
    let invokee = Function::new(&["message"], |inv| {
        Ok(Some(inv.this()?.add(inv.require("message")?)?))
    });

    let result = invokee.call_with("I am this!", args!["Where did it come from?"])?;

    expect.returns(result, "I am this!Where did it come from?");
    Ok(())
}

fn using_apply(expect: &mut Expect) -> Result<()> {
    let invokee = Function::new(&["message1", "message2"], |inv| {
        let joined = inv
            .this()?
            .add(inv.require("message1")?)?
            .add(inv.require("message2")?)?;
        Ok(Some(joined))
    });

    let result = invokee.apply(
        "I am this!",
        vec![Value::from("I am arg1"), Value::from("I am arg2")],
    )?;

    expect.returns(result, "I am this!I am arg1I am arg2");
    Ok(())
}

fn call_and_apply_agree(expect: &mut Expect) -> Result<()> {
    let f = Function::new(&["a", "b"], |inv| {
        Ok(Some(inv.this()?.add(inv.require("a")?)?.add(inv.require("b")?)?))
    });

    let listed = f.call_with("X", args!["a", "b"])?;
    let sequence = f.apply("X", vec![Value::from("a"), Value::from("b")])?;

    expect.returns(listed.clone(), "Xab");
    expect.returns(sequence.clone(), "Xab");
    expect.equal(listed, sequence);
    expect.truthy(
        f.call(args!["a", "b"]) == Err(KoanError::MissingReceiver),
        "a plain call has no receiver",
    );
    Ok(())
}
