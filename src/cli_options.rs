use std::collections::HashMap;

pub struct CliOptions {
    pub use_multi_thread: bool,
    pub scene_name: String,
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub depth: Option<u32>,
    pub output: String,
    pub help: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            use_multi_thread: true,
            scene_name: String::from("spheres"),
            width: 640,
            height: 480,
            samples: 4,
            depth: None,
            output: String::from("output.png"),
            help: false,
        }
    }
}

impl CliOptions {
    pub fn message() -> &'static str {
        r#"
        --use_multi_thread | --use_single_thread
        --scene <spheres | quadrics | cube>
        --width <pixels> --height <pixels>
        --samples <per pixel>
        --depth <max reflection/transmission generations>
        --output <file.png>
        "#
    }
}

fn parse_number(key: &str, value: Option<String>) -> Result<u32, String> {
    let value = value.ok_or(format!("{} needs a value", key))?;
    match value.parse::<u32>() {
        Ok(n) if n > 0 || key == "--depth" => Ok(n),
        _ => Err(format!("{} expects a positive integer, got {}", key, value)),
    }
}

pub fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut pairs: HashMap<String, Option<String>> = HashMap::new();
    let mut args = args.into_iter().rev().collect::<Vec<_>>();
    args.pop(); // Removes args[0]

    while let Some(key) = args.pop() {
        if !key.starts_with('-') {
            return Err(format!("Unrecognized key {}", key));
        }
        match args.last() {
            None => {
                pairs.insert(key, None);
            }
            Some(value) => {
                if value.starts_with('-') {
                    pairs.insert(key, None);
                } else {
                    let value = args.pop();
                    pairs.insert(key, value);
                }
            }
        }
    }
    let mut options = CliOptions::default();
    for (k, v) in pairs.into_iter() {
        match k.as_str() {
            "--use_multi_thread" => options.use_multi_thread = true,
            "--use_single_thread" => options.use_multi_thread = false,
            "--scene" => options.scene_name = v.ok_or("--scene needs a name")?,
            "--output" => options.output = v.ok_or("--output needs a file name")?,
            "--width" => options.width = parse_number(&k, v)?,
            "--height" => options.height = parse_number(&k, v)?,
            "--samples" => options.samples = parse_number(&k, v)?,
            "--depth" => options.depth = Some(parse_number(&k, v)?),
            "--help" => options.help = true,
            _ => return Err(format!("Unrecognized key {}", k)),
        }
    }
    Ok(options)
}
