use stockroom_core::Aggregate;

/// Execute a command against an in-memory aggregate: decide, then evolve.
///
/// `handle` runs first and must not mutate; events are applied only when it
/// succeeds. A rejected command therefore leaves `aggregate` untouched.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
