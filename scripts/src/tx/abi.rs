use alloy::sol;

sol! {
#[sol(rpc)]
interface ISimpleStorage {
    function store(uint256 favoriteNumber) external;

    function retrieve() external view returns (uint256);
}

}
