use lazy_static::lazy_static;
use minijinja::Environment;

use crate::usuarios::dto::IndexPage;

lazy_static! {
    static ref TEMPLATES: Environment<'static> = {
        let mut env = Environment::new();
        env.add_template("index.html", include_str!("../templates/index.html"))
            .unwrap();
        env
    };
}

pub fn render_index(page: &IndexPage) -> Result<String, minijinja::Error> {
    TEMPLATES.get_template("index.html")?.render(page)
}
