use anyhow::Result;
use serde::Serialize;

use super::sink::current_sink;
use crate::output::types::{Envelope, Meta};

// Envelopes go to whichever sink is installed (stdout unless captured).

pub fn print_plan<T: Serialize>(op: &str, plan: &T, meta: Option<Meta>) -> Result<()> {
    let env = Envelope::plan(op, plan, meta)?;
    current_sink().on_plan(&env)
}

pub fn print_result<T: Serialize>(op: &str, result: &T, meta: Option<Meta>) -> Result<()> {
    let env = Envelope::result(op, result, meta)?;
    current_sink().on_result(&env)
}
