fn main() {
    if lib_clash::init().is_err() {
        std::process::exit(1);
    }
}
