#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadCatalog { limit: u16 },
    LoadSprite { name: String, url: String },
}
