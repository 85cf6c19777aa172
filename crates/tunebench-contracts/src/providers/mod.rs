/// Ordered set of comparison backends, looked up by name.
///
/// Registration order is the run order; `list` is sorted for display.
pub struct BackendRegistry<T: ?Sized + NamedBackend> {
    backends: Vec<Box<T>>,
}

pub trait NamedBackend {
    fn name(&self) -> &str;
}

impl<T: ?Sized + NamedBackend> BackendRegistry<T> {
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Adds a backend, replacing any existing backend with the same name in place.
    pub fn register(&mut self, backend: Box<T>) {
        if let Some(slot) = self
            .backends
            .iter_mut()
            .find(|existing| existing.name() == backend.name())
        {
            *slot = backend;
            return;
        }
        self.backends.push(backend);
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.backends
            .iter()
            .find(|backend| backend.name() == name)
            .map(|backend| backend.as_ref())
    }

    pub fn list(&self) -> Vec<String> {
        let mut names = self
            .backends
            .iter()
            .map(|backend| backend.name().to_string())
            .collect::<Vec<String>>();
        names.sort();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.backends.iter().map(|backend| backend.as_ref())
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl<T: ?Sized + NamedBackend> Default for BackendRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
