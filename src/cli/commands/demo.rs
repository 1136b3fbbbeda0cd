//! Demo command: observe `x` on a sample record and trace every event.

use std::cell::RefCell;
use std::rc::Rc;

use console::style;
use serde_json::{Value, json};

use crate::cli::args::DemoArgs;
use crate::config::DispatchConfig;
use crate::observer::{Handlers, ObserverOptions, PropertyObserver, ReadDecision, WriteDecision};
use crate::record::{Record, SetOutcome};

type Trace = Rc<RefCell<Vec<String>>>;

fn line(event: &str, record: &Record, name: &str, args: &[&Value]) -> String {
    let mut out = format!("property: {event} {record} {name}");
    for arg in args {
        out.push(' ');
        out.push_str(&arg.to_string());
    }
    out
}

fn parse_override(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn tracing_handlers(args: &DemoArgs, trace: &Trace) -> Handlers {
    let override_value = args.override_value.as_deref().map(parse_override);
    let veto_above = args.veto_above;

    let t = Rc::clone(trace);
    let handlers = Handlers::new().on_get_before(move |record, name| {
        t.borrow_mut().push(line("get:before", record, name, &[]));
        Ok(match &override_value {
            Some(value) => ReadDecision::Override(value.clone()),
            None => ReadDecision::NoOverride,
        })
    });

    let t = Rc::clone(trace);
    let handlers = handlers.on_get(move |record, name, value| {
        t.borrow_mut().push(line("get", record, name, &[value]));
        Ok(())
    });

    let t = Rc::clone(trace);
    let handlers = handlers.on_get_after(move |record, name, value| {
        t.borrow_mut().push(line("get:after", record, name, &[value]));
        Ok(())
    });

    let t = Rc::clone(trace);
    let handlers = handlers.on_set_before(move |record, name, new, old| {
        t.borrow_mut().push(line("set:before", record, name, &[new, old]));
        let vetoed = matches!((veto_above, new.as_i64()), (Some(limit), Some(n)) if n > limit);
        Ok(if vetoed {
            WriteDecision::Veto
        } else {
            WriteDecision::Proceed
        })
    });

    let t = Rc::clone(trace);
    let handlers = handlers.on_set(move |record, name, new, old| {
        t.borrow_mut().push(line("set", record, name, &[new, old]));
        Ok(())
    });

    let t = Rc::clone(trace);
    handlers.on_set_after(move |record, name, new, old| {
        t.borrow_mut().push(line("set:after", record, name, &[new, old]));
        Ok(())
    })
}

/// Run the walkthrough and return every output line in order.
///
/// Writes each configured value, reads `x` once, unobserves, then writes
/// 512 to show that nothing fires any more.
pub fn demo_trace(args: &DemoArgs, dispatch: DispatchConfig) -> anyhow::Result<Vec<String>> {
    let trace: Trace = Rc::new(RefCell::new(Vec::new()));
    let record = Record::from_json(json!({ "x": args.initial, "y": "label" }))?;

    let mut observer = PropertyObserver::new(
        &record,
        "x",
        ObserverOptions {
            on: tracing_handlers(args, &trace),
            dispatch,
        },
    )?;

    for value in &args.sets {
        if record.set("x", json!(value))? == SetOutcome::Vetoed {
            trace.borrow_mut().push(format!("vetoed: x = {value}"));
        }
    }

    let x = record.get("x")?;
    trace.borrow_mut().push(format!("read: x = {x}"));

    observer.unobserve();
    record.set("x", json!(512))?;
    let x = record.get("x")?;
    trace.borrow_mut().push(format!("unobserved: x = {x}"));

    let lines = trace.borrow().clone();
    Ok(lines)
}

/// Run demo command - print the event trace.
pub fn run_demo(args: &DemoArgs, dispatch: DispatchConfig) -> anyhow::Result<()> {
    for entry in demo_trace(args, dispatch)? {
        match entry.strip_prefix("property: ") {
            Some(rest) => {
                let (event, tail) = rest.split_once(' ').unwrap_or((rest, ""));
                println!("property: {} {tail}", style(event).cyan());
            }
            None => println!("{}", style(entry).bold()),
        }
    }
    Ok(())
}
