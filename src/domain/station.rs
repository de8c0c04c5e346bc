// Station domain model
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: i64,
    pub name: String,
}

impl Station {
    pub fn new(id: i64, name: String) -> Self {
        Self { id, name }
    }

    /// Convert "Estacion_LIA_SantoTomas" to "Estacion LIA SantoTomas"
    pub fn display_name(&self) -> String {
        self.name.trim_end_matches('_').replace('_', " ")
    }
}
