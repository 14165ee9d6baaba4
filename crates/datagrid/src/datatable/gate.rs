use std::cell::Cell;

/// Single-flight guard: at most one outstanding fetch per data source
#[derive(Debug, Default)]
pub struct FetchGate {
    loading: Cell<bool>,
}

impl FetchGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the gate. Returns `false` if a fetch is already outstanding.
    pub fn acquire(&self) -> bool {
        if self.loading.get() {
            return false;
        }
        self.loading.set(true);
        true
    }

    /// Takes the gate for the lifetime of the returned guard. `None` if a
    /// fetch is already outstanding.
    pub fn try_acquire(&self) -> Option<GateGuard<'_>> {
        self.acquire().then_some(GateGuard { gate: self })
    }

    pub fn release(&self) {
        self.loading.set(false);
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }
}

/// Releases the gate when dropped, including when the owning future is
/// cancelled mid-fetch
#[derive(Debug)]
pub struct GateGuard<'a> {
    gate: &'a FetchGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
