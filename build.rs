fn main() {
    println!("cargo:rerun-if-changed=lib/src/parser_layer/statement.lalrpop");

    lalrpop::Configuration::new()
        .set_in_dir("lib/src")
        .set_out_dir(std::env::var("OUT_DIR").unwrap())
        .process()
        .unwrap();
}
