use crate::{
    binding::ParameterValues,
    exec::ExecuteError,
    expr::Expr,
    value::{Record, Value},
};
use std::borrow::Cow;

///
/// Env
/// Evaluation scope: the lambda variable bound to the current row, plus
/// the parameter values of the running execution.
///

#[derive(Clone, Copy, Debug)]
pub struct Env<'a> {
    variable: &'a str,
    row: &'a Value,
    parameters: &'a ParameterValues,
}

impl<'a> Env<'a> {
    #[must_use]
    pub const fn new(variable: &'a str, row: &'a Value, parameters: &'a ParameterValues) -> Self {
        Self {
            variable,
            row,
            parameters,
        }
    }
}

/// Evaluate `expr` within `env`.
pub fn evaluate(expr: &Expr, env: &Env<'_>) -> Result<Value, ExecuteError> {
    eval(expr, env).map(Cow::into_owned)
}

/// Apply a compiled `Lambda(Construct)` to every row.
pub fn project_rows<'r>(
    expr: &Expr,
    rows: impl IntoIterator<Item = &'r Record>,
    parameters: &ParameterValues,
) -> Result<Vec<Record>, ExecuteError> {
    let lambda = expr.as_lambda().ok_or(ExecuteError::NotALambda)?;
    let rows = rows.into_iter();
    let mut out = Vec::with_capacity(rows.size_hint().0);

    for row in rows {
        let row = Value::Record(row.clone());
        let env = Env::new(lambda.param(), &row, parameters);
        match evaluate(lambda.body(), &env)? {
            Value::Record(record) => out.push(record),
            _ => return Err(ExecuteError::NotARecord),
        }
    }

    Ok(out)
}

fn eval<'e>(expr: &'e Expr, env: &Env<'e>) -> Result<Cow<'e, Value>, ExecuteError> {
    match expr {
        Expr::Variable(name) => {
            if name == env.variable {
                Ok(Cow::Borrowed(env.row))
            } else {
                Err(ExecuteError::UnboundVariable { name: name.clone() })
            }
        }
        Expr::Member { source, name, .. } => match eval(source, env)? {
            // reading through an absent nested record yields null
            Cow::Borrowed(Value::Null) | Cow::Owned(Value::Null) => Ok(Cow::Owned(Value::Null)),
            Cow::Borrowed(value) => member(value, name).map(Cow::Borrowed),
            Cow::Owned(value) => member(&value, name).map(|v| Cow::Owned(v.clone())),
        },
        Expr::Constant { value, .. } => Ok(Cow::Borrowed(value)),
        Expr::Parameter { name, .. } => Ok(Cow::Borrowed(env.parameters.lookup(name)?)),
        Expr::Construct(construct) => {
            let fields = construct
                .fields()
                .iter()
                .map(|(name, field)| Ok((name.as_str(), evaluate(field, env)?)))
                .collect::<Result<Vec<_>, ExecuteError>>()?;

            Ok(Cow::Owned(Value::Record(Record::from_fields(fields)?)))
        }
        Expr::Lambda(_) => Err(ExecuteError::NestedLambda),
    }
}

fn member<'v>(value: &'v Value, name: &str) -> Result<&'v Value, ExecuteError> {
    value
        .as_record()
        .and_then(|record| record.get(name))
        .ok_or_else(|| ExecuteError::MissingMember {
            member: name.to_string(),
            found: value.to_string(),
        })
}
