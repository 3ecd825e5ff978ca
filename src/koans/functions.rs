//! About Functions
//!
//! Declaring functions, argument tolerance, scope resolution and functions
//! as values.

use anyhow::Result;

use crate::args;
use crate::assertion::Expect;
use crate::lang::{Function, Record, Scope, Value};
use crate::models::{Case, Suite};

pub const SUITE_NAME: &str = "About Functions";

pub fn suite() -> Suite {
    Suite::new(
        SUITE_NAME,
        vec![
            Case::new("should declare functions", declare_functions),
            Case::new(
                "should know internal variables override outer variables",
                internal_overrides_outer,
            ),
            Case::new("should have lexical scoping", lexical_scoping),
            Case::new(
                "should use lexical scoping to synthesise functions",
                synthesise_functions,
            ),
            Case::new("should allow extra function arguments", extra_arguments),
            Case::new("should pass functions as values", functions_as_values),
        ],
    )
}

fn declare_functions(expect: &mut Expect) -> Result<()> {
    let add = Function::new(&["a", "b"], |inv| {
        Ok(Some(inv.require("a")?.add(inv.require("b")?)?))
    })
    .named("add");

    expect.returns(add.call(args![1, 2])?, 3);
    Ok(())
}

fn internal_overrides_outer(expect: &mut Expect) -> Result<()> {
    let outer = Scope::root();
    outer.declare("message", "Outer");

    let get_message = Function::closure(&outer, &[], |frame, _| Ok(frame.lookup("message")));
    let override_message = Function::closure(&outer, &[], |frame, _| {
        frame.declare("message", "Inner");
        Ok(frame.lookup("message"))
    });

    expect.returns(get_message.call(args![])?, "Outer");
    expect.returns(override_message.call(args![])?, "Inner");
    expect.returns(outer.lookup("message"), "Outer");
    Ok(())
}

fn lexical_scoping(expect: &mut Expect) -> Result<()> {
    let top = Scope::root();
    top.declare("variable", "top-level");

    let parent = Function::closure(&top, &[], |frame, _| {
        frame.declare("variable", "local");
        let child = Function::closure(frame, &[], |inner, _| Ok(inner.lookup("variable")));
        child.call(args![])
    });
    expect.returns(parent.call(args![])?, "local");

    // Resolution follows the definition site, not the caller's bindings.
    let reader = Function::closure(&top, &[], |frame, _| Ok(frame.lookup("variable")));
    let elsewhere = Scope::root();
    elsewhere.declare("variable", "call-site");
    let caller = Function::closure(&elsewhere, &[], move |_, _| reader.call(args![]));
    expect.returns(caller.call(args![])?, "top-level");

    expect.returns(top.lookup("variable"), "top-level");
    Ok(())
}

fn make_mystery_function(maker_value: i64) -> impl Fn(i64) -> i64 {
    move |param| maker_value + param
}

fn synthesise_functions(expect: &mut Expect) -> Result<()> {
    let mystery_function3 = make_mystery_function(3);
    let mystery_function5 = make_mystery_function(5);

    expect.equal(mystery_function3(10) + mystery_function5(5), 23);
    // Making the second one left the first untouched.
    expect.equal(mystery_function3(10), 13);
    Ok(())
}

fn extra_arguments(expect: &mut Expect) -> Result<()> {
    let return_first_arg =
        Function::new(&["firstArg"], |inv| Ok(inv.param("firstArg").cloned()));
    expect.returns(
        return_first_arg.call(args!["first", "second", "third"])?,
        "first",
    );

    let return_second_arg = Function::new(&["firstArg", "secondArg"], |inv| {
        Ok(inv.param("secondArg").cloned())
    });
    expect.absent(&return_second_arg.call(args!["only give first arg"])?);

    let return_all_args = Function::new(&[], |inv| {
        let joined: Vec<String> = inv.args().iter().map(ToString::to_string).collect();
        Ok(Some(Value::from(joined.join(","))))
    });
    expect.returns(
        return_all_args.call(args!["first", "second", "third"])?,
        "first,second,third",
    );

    let count_extras = Function::new(&["firstArg"], |inv| {
        Ok(Some(Value::from(inv.args().rest(1).len() as i64)))
    });
    expect.equal(count_extras.arity(), 1);
    expect.returns(count_extras.call(args!["first", "second", "third"])?, 2);
    Ok(())
}

fn functions_as_values(expect: &mut Expect) -> Result<()> {
    let append_rules = Function::new(&["name"], |inv| {
        Ok(Some(inv.require("name")?.add(&Value::from(" rules!"))?))
    });
    let append_double_rules = Function::new(&["name"], |inv| {
        Ok(Some(inv.require("name")?.add(&Value::from(" totally rules!"))?))
    });

    let mut praise_singer = Record::new().with_field("givePraise", append_rules);
    expect.returns(
        praise_singer.invoke("givePraise", args!["John"])?,
        "John rules!",
    );

    praise_singer.set("givePraise", append_double_rules);
    expect.returns(
        praise_singer.invoke("givePraise", args!["Mary"])?,
        "Mary totally rules!",
    );
    Ok(())
}
