fn main() {
    wallet_matcher::main();
}
