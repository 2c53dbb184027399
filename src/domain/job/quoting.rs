//! HTCondor "new syntax" quoting for the `Arguments` and `Environment` commands.

/// Quote arguments for `Arguments = "..."`: each argument is wrapped in single
/// quotes, with embedded single and double quotes doubled.
pub fn quote_arguments<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| format!("'{}'", arg.as_ref().replace('\'', "''").replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote `NAME=value` pairs for `Environment = "..."`.
pub fn quote_environment<K: AsRef<str>, V: AsRef<str>>(env: &[(K, V)]) -> String {
    env.iter()
        .map(|(name, value)| {
            let value = value.as_ref().replace('"', "\"\"");
            if value.contains(' ') || value.contains('\'') {
                format!("{}='{}'", name.as_ref(), value.replace('\'', "''"))
            } else {
                format!("{}={}", name.as_ref(), value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
