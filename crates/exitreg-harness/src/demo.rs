//! The canonical example run: four registrations, drained newest first.

use std::sync::Arc;

use exitreg_core::{Args, ExitRegistry, HandlerFailure, args};
use parking_lot::Mutex;
use serde_json::Value;

fn render(value: Option<&Value>) -> String {
    value.map_or_else(|| "None".to_string(), ToString::to_string)
}

/// Registers `x1()`, `x2(12)`, `x3(5, "bar")` and `x3("no kwd args")` on
/// `registry`, drains it, and returns the lines the handlers printed.
pub fn run_demo(registry: &ExitRegistry) -> Result<Vec<String>, HandlerFailure> {
    let out: Arc<Mutex<Vec<String>>> = Arc::default();

    let sink = Arc::clone(&out);
    let x1 = move |_: &Args| -> Result<(), HandlerFailure> {
        sink.lock().push("running x1".to_string());
        Ok(())
    };
    let sink = Arc::clone(&out);
    let x2 = move |args: &Args| -> Result<(), HandlerFailure> {
        sink.lock()
            .push(format!("running x2({})", render(args.param(0, "n"))));
        Ok(())
    };
    let sink = Arc::clone(&out);
    let x3 = Arc::new(move |args: &Args| -> Result<(), HandlerFailure> {
        sink.lock().push(format!(
            "running x3({}, kwd={})",
            render(args.param(0, "n")),
            render(args.param(1, "kwd")),
        ));
        Ok(())
    });

    registry.register_fn(x1, Args::none());
    registry.register_fn(x2, args![12]);
    let x3 = registry.register(x3, args![5, "bar"]);
    registry.register(x3, args!["no kwd args"]);

    registry.run_pending()?;
    let lines = std::mem::take(&mut *out.lock());
    Ok(lines)
}
