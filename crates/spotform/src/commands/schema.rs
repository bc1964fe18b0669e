use spotform_core::FieldRegistry;

pub fn handle<R>(registry: &FieldRegistry<R>) -> anyhow::Result<()> {
    let schema = registry.schema_map();
    super::print_json(&*schema)
}
